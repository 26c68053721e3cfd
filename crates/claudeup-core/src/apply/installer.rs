//! Plugin and marketplace installation
//!
//! Downloading and installing is Claude Code's job; the engine only asks
//! for it through [`Installer`].

use claudeup_host::{MarketplaceSource, Scope};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by an installer
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Failed to run {program}: {source}. Is Claude Code installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Carries out marketplace registrations and plugin installs
pub trait Installer {
    fn add_marketplace(&self, source: &MarketplaceSource) -> Result<(), InstallError>;

    /// Install at `scope`; `project` is the working directory for project
    /// and local installs
    fn install_plugin(
        &self,
        plugin: &str,
        scope: Scope,
        project: Option<&Path>,
    ) -> Result<(), InstallError>;
}

/// Installer that shells out to the `claude` CLI
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: PathBuf,
}

impl Default for ClaudeCli {
    fn default() -> Self {
        Self::new("claude")
    }
}

impl ClaudeCli {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], dir: Option<&Path>) -> Result<(), InstallError> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        debug!(program = %self.program.display(), ?args, "running installer");

        let output = command.output().map_err(|source| InstallError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(InstallError::Failed {
            command: format!("{} {}", self.program.display(), args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Installer for ClaudeCli {
    fn add_marketplace(&self, source: &MarketplaceSource) -> Result<(), InstallError> {
        self.run(&["plugin", "marketplace", "add", source.location()], None)?;
        info!(%source, "added marketplace");
        Ok(())
    }

    fn install_plugin(
        &self,
        plugin: &str,
        scope: Scope,
        project: Option<&Path>,
    ) -> Result<(), InstallError> {
        self.run(
            &["plugin", "install", plugin, "--scope", scope.as_str()],
            project,
        )?;
        info!(plugin, %scope, "installed plugin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cli = ClaudeCli::new("/nonexistent/claude-binary");
        let err = cli
            .add_marketplace(&MarketplaceSource::GitHub {
                repo: "acme/tools".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, InstallError::Spawn { .. }));
        assert!(err.to_string().contains("PATH"));
    }
}
