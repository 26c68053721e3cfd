//! Project-level profile pointers
//!
//! A project either commits a `.claudeup.json` (project scope) or is
//! registered in `~/.claudeup/projects.json` (local scope).

use crate::error::{ProfileError, ProfileResult};
use crate::paths::PROJECT_CONFIG_FILE;
use chrono::{DateTime, Utc};
use claudeup_host::document::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_FILE_VERSION: u32 = 1;

fn project_file_version() -> u32 {
    PROJECT_FILE_VERSION
}

/// Contents of a project's `.claudeup.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default = "project_file_version")]
    pub version: u32,
    /// Profile active at project scope
    #[serde(default)]
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProjectConfig {
    #[must_use]
    pub fn new(profile: &str) -> Self {
        Self {
            version: PROJECT_FILE_VERSION,
            profile: profile.to_string(),
            applied_at: Some(Utc::now()),
            extra: BTreeMap::new(),
        }
    }

    /// The declared profile, if the field is non-empty
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        Some(self.profile.as_str()).filter(|p| !p.is_empty())
    }

    pub fn load(path: &Path) -> ProfileResult<Option<Self>> {
        Ok(read_json::<Self>(path)?)
    }

    pub fn save(&self, path: &Path) -> ProfileResult<bool> {
        Ok(write_json_atomic(path, self)?)
    }
}

/// A project config file found at or above a directory
#[derive(Debug, Clone, PartialEq)]
pub struct FoundProjectConfig {
    /// Directory containing `.claudeup.json`
    pub root: PathBuf,
    pub path: PathBuf,
    pub config: ProjectConfig,
}

/// Find the nearest `.claudeup.json` at or above `dir`
pub fn find_project_config(dir: &Path) -> ProfileResult<Option<FoundProjectConfig>> {
    let start = normalize_dir(dir);
    for ancestor in start.ancestors() {
        let path = ancestor.join(PROJECT_CONFIG_FILE);
        if path.is_file() {
            if let Some(config) = ProjectConfig::load(&path)? {
                return Ok(Some(FoundProjectConfig {
                    root: ancestor.to_path_buf(),
                    path,
                    config,
                }));
            }
        }
    }
    Ok(None)
}

/// Entry of the project registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// Contents of `projects.json`: absolute project path -> local profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    #[serde(default = "project_file_version")]
    pub version: u32,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectEntry>,
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        Self {
            version: PROJECT_FILE_VERSION,
            projects: BTreeMap::new(),
        }
    }
}

impl ProjectRegistry {
    pub fn load(path: &Path) -> ProfileResult<Self> {
        Ok(read_json::<Self>(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> ProfileResult<bool> {
        Ok(write_json_atomic(path, self)?)
    }

    /// Nearest registered project at or above `dir`
    #[must_use]
    pub fn lookup(&self, dir: &Path) -> Option<(PathBuf, &ProjectEntry)> {
        let dir = normalize_dir(dir);
        self.projects
            .iter()
            .filter(|(root, _)| dir.starts_with(Path::new(root)))
            .max_by_key(|(root, _)| Path::new(root).components().count())
            .map(|(root, entry)| (PathBuf::from(root), entry))
    }

    /// Register `dir` with a profile
    pub fn set(&mut self, dir: &Path, profile: &str) {
        self.projects.insert(
            registry_key(dir),
            ProjectEntry {
                profile: profile.to_string(),
                applied_at: Some(Utc::now()),
            },
        );
    }

    /// Remove the entry for exactly `dir`; returns whether one existed
    pub fn remove(&mut self, dir: &Path) -> bool {
        self.projects.remove(&registry_key(dir)).is_some()
    }

    /// Drop every entry pointing at `profile`; returns the number removed
    pub fn remove_profile(&mut self, profile: &str) -> usize {
        let before = self.projects.len();
        self.projects.retain(|_, entry| entry.profile != profile);
        before - self.projects.len()
    }
}

fn registry_key(dir: &Path) -> String {
    normalize_dir(dir).to_string_lossy().into_owned()
}

/// Canonical absolute form of a directory, falling back to the input when
/// it cannot be resolved
#[must_use]
pub fn normalize_dir(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Remove a project config file
pub fn remove_project_config(path: &Path) -> ProfileResult<()> {
    fs::remove_file(path).map_err(|e| ProfileError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo");
        let nested = root.join("src").join("module");
        fs::create_dir_all(&nested).unwrap();
        ProjectConfig::new("backend")
            .save(&root.join(PROJECT_CONFIG_FILE))
            .unwrap();

        let found = find_project_config(&nested).unwrap().unwrap();
        assert_eq!(found.config.profile(), Some("backend"));
        assert_eq!(found.root, normalize_dir(&root));
    }

    #[test]
    fn test_nearest_project_config_wins() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("mono");
        let inner = outer.join("services").join("api");
        fs::create_dir_all(&inner).unwrap();
        ProjectConfig::new("outer").save(&outer.join(PROJECT_CONFIG_FILE)).unwrap();
        ProjectConfig::new("inner").save(&inner.join(PROJECT_CONFIG_FILE)).unwrap();

        let found = find_project_config(&inner).unwrap().unwrap();
        assert_eq!(found.config.profile(), Some("inner"));
    }

    #[test]
    fn test_registry_lookup_prefers_deepest_enclosing_path() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("work");
        let inner = outer.join("app");
        let deeper = inner.join("src");
        fs::create_dir_all(&deeper).unwrap();

        let mut registry = ProjectRegistry::default();
        registry.set(&outer, "outer");
        registry.set(&inner, "inner");

        let (root, entry) = registry.lookup(&deeper).unwrap();
        assert_eq!(entry.profile, "inner");
        assert_eq!(root, normalize_dir(&inner));
        assert!(registry.lookup(temp.path()).is_none());
    }

    #[test]
    fn test_registry_does_not_match_sibling_prefix() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        let app2 = temp.path().join("app2");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&app2).unwrap();

        let mut registry = ProjectRegistry::default();
        registry.set(&app, "a");
        assert!(registry.lookup(&app2).is_none());
    }

    #[test]
    fn test_remove_profile_clears_all_entries() {
        let mut registry = ProjectRegistry::default();
        registry.set(Path::new("/nonexistent/a"), "x");
        registry.set(Path::new("/nonexistent/b"), "x");
        registry.set(Path::new("/nonexistent/c"), "y");
        assert_eq!(registry.remove_profile("x"), 2);
        assert_eq!(registry.projects.len(), 1);
    }
}
