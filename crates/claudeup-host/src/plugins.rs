//! Installed-plugin and marketplace registries
//!
//! Claude Code records installs in `plugins/installed_plugins.json`, keyed
//! by `plugin@marketplace`, and registered marketplaces in
//! `plugins/known_marketplaces.json`.

use crate::document::{read_json, write_json_atomic};
use crate::error::HostResult;
use crate::types::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

const INSTALLED_PLUGINS_VERSION: u32 = 2;

/// Split a `plugin@marketplace` key into its parts
#[must_use]
pub fn split_plugin_id(plugin_id: &str) -> (&str, Option<&str>) {
    match plugin_id.rsplit_once('@') {
        Some((name, marketplace)) if !name.is_empty() && !marketplace.is_empty() => {
            (name, Some(marketplace))
        }
        _ => (plugin_id, None),
    }
}

/// One installation of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    /// Scope the plugin was installed at (`user`, `project`, `local`, `managed`)
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Project the install belongs to, for project/local installs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Where the plugin's files live
    pub install_path: PathBuf,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit_sha: Option<String>,
    /// Installed from a local directory rather than a downloaded cache
    #[serde(default)]
    pub is_local: bool,
}

fn default_scope() -> String {
    "user".to_string()
}

impl InstallRecord {
    /// Parsed install scope, `None` for scopes claudeup does not manage
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.scope.parse().ok()
    }

    /// Whether the install path is gone. Checked on every call, never cached.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        !self.install_path.exists()
    }
}

/// Display status of an installed plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Install path no longer exists
    Stale,
    /// Enabled in settings
    Enabled,
    /// Disabled in settings
    Disabled,
    /// Downloaded copy, not mentioned in settings
    Cached,
    /// Local directory install, not mentioned in settings
    Local,
}

impl PluginStatus {
    /// Derive the status of an install given its explicit settings state
    #[must_use]
    pub fn derive(record: &InstallRecord, settings_state: Option<bool>) -> Self {
        if record.is_stale() {
            return Self::Stale;
        }
        match settings_state {
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
            None if record.is_local => Self::Local,
            None => Self::Cached,
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stale => "stale",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Cached => "cached",
            Self::Local => "local",
        };
        f.pad(s)
    }
}

/// Contents of `installed_plugins.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPlugins {
    #[serde(default = "installed_plugins_version")]
    pub version: u32,
    #[serde(default)]
    pub plugins: BTreeMap<String, Vec<InstallRecord>>,
}

fn installed_plugins_version() -> u32 {
    INSTALLED_PLUGINS_VERSION
}

impl Default for InstalledPlugins {
    fn default() -> Self {
        Self {
            version: INSTALLED_PLUGINS_VERSION,
            plugins: BTreeMap::new(),
        }
    }
}

impl InstalledPlugins {
    /// Load the registry; a missing file is an empty registry
    pub fn load(path: &Path) -> HostResult<Self> {
        let registry = read_json::<Self>(path)?.unwrap_or_default();
        debug!(count = registry.plugins.len(), path = %path.display(), "loaded installed plugins");
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> HostResult<bool> {
        write_json_atomic(path, self)
    }

    /// Install records for a plugin
    #[must_use]
    pub fn records(&self, plugin_id: &str) -> &[InstallRecord] {
        self.plugins.get(plugin_id).map_or(&[], Vec::as_slice)
    }

    /// Whether the plugin has an install usable from `scope`.
    ///
    /// A user-scope install serves every project; project and local installs
    /// only count for the project they were made in.
    #[must_use]
    pub fn is_installed_for(&self, plugin_id: &str, scope: Scope, project: Option<&Path>) -> bool {
        self.records(plugin_id).iter().any(|record| {
            match record.scope() {
                Some(Scope::User) => true,
                Some(s) if s == scope => match (project, record.project_path.as_deref()) {
                    (Some(p), Some(recorded)) => Path::new(recorded) == p,
                    _ => true,
                },
                _ => false,
            }
        })
    }

    /// Add or replace the record for `(plugin, scope, project)`
    pub fn record_install(&mut self, plugin_id: &str, record: InstallRecord) {
        let records = self.plugins.entry(plugin_id.to_string()).or_default();
        records.retain(|r| !(r.scope == record.scope && r.project_path == record.project_path));
        records.push(record);
    }
}

/// Where a marketplace comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum MarketplaceSource {
    /// GitHub repository in `owner/repo` form
    GitHub { repo: String },
    /// Any git URL
    Git { url: String },
    /// Local directory
    Directory { path: String },
}

impl MarketplaceSource {
    /// The string handed to `claude plugin marketplace add`
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::GitHub { repo } => repo,
            Self::Git { url } => url,
            Self::Directory { path } => path,
        }
    }

    /// Name Claude Code derives for the marketplace when none is declared
    #[must_use]
    pub fn default_name(&self) -> String {
        let trimmed = self
            .location()
            .trim_end_matches('/')
            .trim_end_matches(".git");
        trimmed
            .rsplit(['/', '\\', ':'])
            .next()
            .unwrap_or(trimmed)
            .to_string()
    }
}

impl fmt::Display for MarketplaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub { repo } => write!(f, "github:{repo}"),
            Self::Git { url } => write!(f, "git:{url}"),
            Self::Directory { path } => write!(f, "directory:{path}"),
        }
    }
}

/// One entry of `known_marketplaces.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceEntry {
    pub source: MarketplaceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_location: Option<String>,
    /// Keys claudeup does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Contents of `known_marketplaces.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownMarketplaces {
    pub entries: BTreeMap<String, MarketplaceEntry>,
}

impl KnownMarketplaces {
    pub fn load(path: &Path) -> HostResult<Self> {
        Ok(read_json::<Self>(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> HostResult<bool> {
        write_json_atomic(path, self)
    }

    /// Whether a marketplace with this source is registered (under any name)
    #[must_use]
    pub fn contains_source(&self, source: &MarketplaceSource) -> bool {
        self.entries.values().any(|e| &e.source == source)
    }

    /// Register a marketplace under `name`
    pub fn register(&mut self, name: &str, source: MarketplaceSource) {
        self.entries.insert(
            name.to_string(),
            MarketplaceEntry {
                source,
                install_location: None,
                extra: BTreeMap::new(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(path: PathBuf, is_local: bool) -> InstallRecord {
        InstallRecord {
            scope: "user".to_string(),
            project_path: None,
            install_path: path,
            version: "1.0.0".to_string(),
            installed_at: None,
            last_updated: None,
            git_commit_sha: None,
            is_local,
        }
    }

    #[test]
    fn test_split_plugin_id() {
        assert_eq!(split_plugin_id("lint@tools"), ("lint", Some("tools")));
        assert_eq!(split_plugin_id("lint"), ("lint", None));
        assert_eq!(split_plugin_id("lint@"), ("lint@", None));
    }

    #[test]
    fn test_status_derivation() {
        let temp = TempDir::new().unwrap();
        let present = record(temp.path().to_path_buf(), false);
        let local = record(temp.path().to_path_buf(), true);
        let gone = record(temp.path().join("missing"), false);

        assert_eq!(PluginStatus::derive(&gone, Some(true)), PluginStatus::Stale);
        assert_eq!(PluginStatus::derive(&present, Some(true)), PluginStatus::Enabled);
        assert_eq!(PluginStatus::derive(&present, Some(false)), PluginStatus::Disabled);
        assert_eq!(PluginStatus::derive(&present, None), PluginStatus::Cached);
        assert_eq!(PluginStatus::derive(&local, None), PluginStatus::Local);
    }

    #[test]
    fn test_stale_is_checked_at_read_time() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("plugin");
        fs::create_dir_all(&dir).unwrap();
        let rec = record(dir.clone(), false);
        assert!(!rec.is_stale());
        fs::remove_dir_all(&dir).unwrap();
        assert!(rec.is_stale());
    }

    #[test]
    fn test_installed_plugins_parse_claude_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("installed_plugins.json");
        fs::write(
            &path,
            r#"{
              "version": 2,
              "plugins": {
                "lint@tools": [{
                  "scope": "project",
                  "projectPath": "/work/app",
                  "installPath": "/cache/lint",
                  "version": "0.2.0",
                  "gitCommitSha": "abc123",
                  "isLocal": false
                }]
              }
            }"#,
        )
        .unwrap();

        let installed = InstalledPlugins::load(&path).unwrap();
        let records = installed.records("lint@tools");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].git_commit_sha.as_deref(), Some("abc123"));
        assert!(installed.is_installed_for("lint@tools", Scope::Project, Some(Path::new("/work/app"))));
        assert!(!installed.is_installed_for("lint@tools", Scope::Project, Some(Path::new("/other"))));
        assert!(!installed.is_installed_for("lint@tools", Scope::User, None));
    }

    #[test]
    fn test_marketplace_default_name() {
        let gh = MarketplaceSource::GitHub {
            repo: "acme/claude-tools".to_string(),
        };
        assert_eq!(gh.default_name(), "claude-tools");
        let git = MarketplaceSource::Git {
            url: "https://example.com/team/market.git".to_string(),
        };
        assert_eq!(git.default_name(), "market");
    }

    #[test]
    fn test_known_marketplaces_round_trip_keeps_extra_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("known_marketplaces.json");
        fs::write(
            &path,
            r#"{"tools": {"source": {"source": "github", "repo": "acme/tools"}, "installLocation": "/x", "lastUpdated": "2025-01-01"}}"#,
        )
        .unwrap();

        let mut known = KnownMarketplaces::load(&path).unwrap();
        assert!(known.contains_source(&MarketplaceSource::GitHub {
            repo: "acme/tools".to_string()
        }));
        known.register(
            "other",
            MarketplaceSource::Directory {
                path: "/src/other".to_string(),
            },
        );
        known.save(&path).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["tools"]["lastUpdated"], "2025-01-01");
        assert_eq!(raw["other"]["source"]["source"], "directory");
    }
}
