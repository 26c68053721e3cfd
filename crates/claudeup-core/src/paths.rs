//! Locations of claudeup's own state files

use crate::error::{ProfileError, ProfileResult};
use claudeup_host::{HostError, HostLayout};
use std::path::{Path, PathBuf};

/// Environment variable that relocates the claudeup state directory
pub const CLAUDEUP_HOME_ENV: &str = "CLAUDEUP_HOME";

/// Name of the project-scope config file
pub const PROJECT_CONFIG_FILE: &str = ".claudeup.json";

/// Every path claudeup reads or writes
#[derive(Debug, Clone)]
pub struct ClaudeupPaths {
    state_dir: PathBuf,
    host: HostLayout,
}

impl ClaudeupPaths {
    #[must_use]
    pub fn new(state_dir: PathBuf, host: HostLayout) -> Self {
        Self { state_dir, host }
    }

    /// Resolve from `CLAUDEUP_HOME`, `CLAUDE_CONFIG_DIR` and the home directory
    pub fn from_env() -> ProfileResult<Self> {
        let host = HostLayout::from_env()?;
        let state_dir = match std::env::var_os(CLAUDEUP_HOME_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ProfileError::Host(HostError::HomeNotFound))?
                .join(".claudeup"),
        };
        Ok(Self::new(state_dir, host))
    }

    /// Lay out claudeup and Claude Code state under a single root, as a home
    /// directory would
    #[must_use]
    pub fn rooted(root: &Path) -> Self {
        Self::new(
            root.join(".claudeup"),
            HostLayout::new(root.join(".claude"), root.join(".claude.json")),
        )
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    #[must_use]
    pub fn host(&self) -> &HostLayout {
        &self.host
    }

    /// User-global config holding the user-scope active profile
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join("config.json")
    }

    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.state_dir.join("profiles")
    }

    /// Project registry backing the local scope
    #[must_use]
    pub fn projects_file(&self) -> PathBuf {
        self.state_dir.join("projects.json")
    }

    #[must_use]
    pub fn enabled_file(&self) -> PathBuf {
        self.state_dir.join("enabled.json")
    }

    /// Local storage for file-based extensions
    #[must_use]
    pub fn local_dir(&self) -> PathBuf {
        self.state_dir.join("local")
    }
}
