//! Locations of Claude Code's configuration files
//!
//! Cross-platform resolution of where each scope keeps its settings and
//! MCP server definitions.

use crate::error::{HostError, HostResult};
use crate::types::Scope;
use std::path::{Path, PathBuf};

/// Environment variable that relocates Claude Code's config directory
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Where an MCP server table lives for a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpLocation {
    /// File holding the table
    pub path: PathBuf,
    /// Key under `projects` when the table is per-project inside `.claude.json`
    pub project_key: Option<String>,
}

/// Root locations of the host application's configuration
#[derive(Debug, Clone)]
pub struct HostLayout {
    claude_dir: PathBuf,
    claude_json: PathBuf,
}

impl HostLayout {
    /// Build a layout from explicit locations
    #[must_use]
    pub fn new(claude_dir: PathBuf, claude_json: PathBuf) -> Self {
        Self {
            claude_dir,
            claude_json,
        }
    }

    /// Resolve the layout from `CLAUDE_CONFIG_DIR` or the home directory
    pub fn from_env() -> HostResult<Self> {
        if let Some(dir) = std::env::var_os(CLAUDE_CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            let dir = PathBuf::from(dir);
            let claude_json = dir.join(".claude.json");
            return Ok(Self::new(dir, claude_json));
        }
        let home = dirs::home_dir().ok_or(HostError::HomeNotFound)?;
        Ok(Self::new(home.join(".claude"), home.join(".claude.json")))
    }

    /// Claude Code's config directory (~/.claude)
    #[must_use]
    pub fn claude_dir(&self) -> &Path {
        &self.claude_dir
    }

    /// The user-level `.claude.json` document
    #[must_use]
    pub fn claude_json(&self) -> &Path {
        &self.claude_json
    }

    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.claude_dir.join("plugins")
    }

    #[must_use]
    pub fn installed_plugins_path(&self) -> PathBuf {
        self.plugins_dir().join("installed_plugins.json")
    }

    #[must_use]
    pub fn known_marketplaces_path(&self) -> PathBuf {
        self.plugins_dir().join("known_marketplaces.json")
    }

    /// Settings file for a scope
    pub fn settings_path(&self, scope: Scope, project: Option<&Path>) -> HostResult<PathBuf> {
        match scope {
            Scope::User => Ok(self.claude_dir.join("settings.json")),
            Scope::Project => Ok(require_project(scope, project)?
                .join(".claude")
                .join("settings.json")),
            Scope::Local => Ok(require_project(scope, project)?
                .join(".claude")
                .join("settings.local.json")),
        }
    }

    /// MCP server table for a scope
    ///
    /// User servers sit at the top of `.claude.json`, local servers under
    /// that document's `projects.<path>` entry, and project servers in the
    /// committed `.mcp.json`.
    pub fn mcp_location(&self, scope: Scope, project: Option<&Path>) -> HostResult<McpLocation> {
        match scope {
            Scope::User => Ok(McpLocation {
                path: self.claude_json.clone(),
                project_key: None,
            }),
            Scope::Project => Ok(McpLocation {
                path: require_project(scope, project)?.join(".mcp.json"),
                project_key: None,
            }),
            Scope::Local => Ok(McpLocation {
                path: self.claude_json.clone(),
                project_key: Some(
                    require_project(scope, project)?
                        .to_string_lossy()
                        .into_owned(),
                ),
            }),
        }
    }

    /// Directory Claude Code reads a file-based extension category from
    #[must_use]
    pub fn extension_dir(&self, category: &str) -> PathBuf {
        self.claude_dir.join(category)
    }
}

fn require_project(scope: Scope, project: Option<&Path>) -> HostResult<&Path> {
    project.ok_or(HostError::ProjectRequired(scope))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> HostLayout {
        HostLayout::new(
            PathBuf::from("/home/u/.claude"),
            PathBuf::from("/home/u/.claude.json"),
        )
    }

    #[test]
    fn test_settings_paths_per_scope() {
        let project = Path::new("/work/app");
        let layout = layout();
        assert_eq!(
            layout.settings_path(Scope::User, None).unwrap(),
            PathBuf::from("/home/u/.claude/settings.json")
        );
        assert_eq!(
            layout.settings_path(Scope::Project, Some(project)).unwrap(),
            PathBuf::from("/work/app/.claude/settings.json")
        );
        assert_eq!(
            layout.settings_path(Scope::Local, Some(project)).unwrap(),
            PathBuf::from("/work/app/.claude/settings.local.json")
        );
    }

    #[test]
    fn test_project_scopes_require_project() {
        assert!(matches!(
            layout().settings_path(Scope::Local, None),
            Err(HostError::ProjectRequired(Scope::Local))
        ));
    }

    #[test]
    fn test_local_mcp_is_keyed_by_project() {
        let loc = layout()
            .mcp_location(Scope::Local, Some(Path::new("/work/app")))
            .unwrap();
        assert_eq!(loc.path, PathBuf::from("/home/u/.claude.json"));
        assert_eq!(loc.project_key.as_deref(), Some("/work/app"));
    }
}
