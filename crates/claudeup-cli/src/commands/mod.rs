//! CLI command handlers
//!
//! One module per top-level subcommand. Handlers resolve paths from the
//! environment, call into `claudeup-core` and print to stdout.

pub mod ext;
pub mod mcp;
pub mod plugin;
pub mod profile;

use anyhow::Context as _;
use claudeup_core::{ClaudeupPaths, ConfigStore};
use std::path::PathBuf;
use tracing::debug;

/// Everything a handler needs to locate state
pub struct Context {
    pub store: ConfigStore,
    pub working_dir: PathBuf,
}

impl Context {
    pub fn from_env() -> anyhow::Result<Self> {
        let paths = ClaudeupPaths::from_env()?;
        let store = ConfigStore::open(paths)?;
        let working_dir =
            std::env::current_dir().context("Failed to determine the current directory")?;
        debug!(
            state_dir = %store.paths().state_dir().display(),
            working_dir = %working_dir.display(),
            "resolved paths"
        );
        Ok(Self { store, working_dir })
    }

    pub fn paths(&self) -> &ClaudeupPaths {
        self.store.paths()
    }

    /// Project root for the working directory
    pub fn project_root(&self) -> anyhow::Result<PathBuf> {
        Ok(self.store.project_root(&self.working_dir)?)
    }
}
