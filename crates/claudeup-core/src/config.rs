//! User-global claudeup configuration (`~/.claudeup/config.json`)

use crate::error::ProfileResult;
use claudeup_host::document::{read_json, write_json_atomic};
use claudeup_host::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Scope used by `profile apply` and `profile save` when none is given
    #[serde(default = "default_scope")]
    pub default_scope: Scope,
    /// Apply in replace mode by default
    #[serde(default)]
    pub replace: bool,
}

fn default_scope() -> Scope {
    Scope::User
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_scope: default_scope(),
            replace: false,
        }
    }
}

/// Contents of `config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeupConfig {
    /// Profile active at user scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    /// Keys written by other versions
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ClaudeupConfig {
    /// Load the config; a missing file yields defaults
    pub fn load(path: &Path) -> ProfileResult<Self> {
        Ok(read_json::<Self>(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> ProfileResult<bool> {
        Ok(write_json_atomic(path, self)?)
    }
}
