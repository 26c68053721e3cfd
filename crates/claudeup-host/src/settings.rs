//! Claude Code settings documents
//!
//! Only `enabledPlugins` is managed here; every other key in the file is
//! carried through untouched.

use crate::document::JsonDocument;
use crate::error::HostResult;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const ENABLED_PLUGINS_KEY: &str = "enabledPlugins";

/// A scope's `settings.json` / `settings.local.json`
#[derive(Debug, Clone)]
pub struct SettingsDocument {
    doc: JsonDocument,
}

impl SettingsDocument {
    /// Load settings; a missing file behaves as empty settings
    pub fn load(path: &Path) -> HostResult<Self> {
        Ok(Self {
            doc: JsonDocument::load(path)?,
        })
    }

    /// Explicit plugin enablement entries (`plugin@marketplace` -> enabled)
    #[must_use]
    pub fn enabled_plugins(&self) -> BTreeMap<String, bool> {
        self.doc
            .object_at(&[ENABLED_PLUGINS_KEY])
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Explicit state of one plugin, `None` when the file does not mention it
    #[must_use]
    pub fn plugin_state(&self, plugin_id: &str) -> Option<bool> {
        self.doc
            .object_at(&[ENABLED_PLUGINS_KEY])
            .and_then(|obj| obj.get(plugin_id))
            .and_then(Value::as_bool)
    }

    /// Set a plugin's enablement; returns whether the document changed
    pub fn set_plugin_enabled(&mut self, plugin_id: &str, enabled: bool) -> HostResult<bool> {
        if self.plugin_state(plugin_id) == Some(enabled) {
            return Ok(false);
        }
        self.doc
            .object_at_mut(&[ENABLED_PLUGINS_KEY])?
            .insert(plugin_id.to_string(), Value::Bool(enabled));
        Ok(true)
    }

    #[must_use]
    pub fn document(&self) -> &JsonDocument {
        &self.doc
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.doc.is_modified()
    }

    /// Atomically write the settings back if anything changed
    pub fn save(&mut self) -> HostResult<bool> {
        self.doc.save()
    }
}
