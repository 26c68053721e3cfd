//! Shared types for host configuration access

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration scope - a layer in Claude Code's settings hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// User-global scope (~/.claude/settings.json)
    User,
    /// Project scope (.claude/settings.json, committed)
    Project,
    /// Local scope (.claude/settings.local.json, gitignored)
    Local,
}

impl Scope {
    /// All scopes, lowest precedence first
    pub const ALL: [Scope; 3] = [Scope::User, Scope::Project, Scope::Local];

    /// Precedence when resolving the active profile (higher wins)
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            Self::Project => 3,
            Self::Local => 2,
            Self::User => 1,
        }
    }

    /// Whether this scope is tied to a project directory
    #[must_use]
    pub fn needs_project(self) -> bool {
        !matches!(self, Self::User)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "project" => Ok(Self::Project),
            "local" => Ok(Self::Local),
            _ => Err(HostError::InvalidScope(s.to_string())),
        }
    }
}
