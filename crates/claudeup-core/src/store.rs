//! Configuration store handle
//!
//! Opened at command start and passed explicitly to the resolver and the
//! apply engine. Every pointer write is an atomic replace of its file.

use crate::config::{ClaudeupConfig, Preferences};
use crate::error::{ProfileError, ProfileResult};
use crate::paths::{ClaudeupPaths, PROJECT_CONFIG_FILE};
use crate::project::{
    find_project_config, normalize_dir, remove_project_config, ProjectConfig, ProjectRegistry,
};
use claudeup_host::Scope;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Handle over claudeup's persisted state
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: ClaudeupPaths,
    config: ClaudeupConfig,
}

impl ConfigStore {
    /// Open the store, reading the user-global config
    pub fn open(paths: ClaudeupPaths) -> ProfileResult<Self> {
        let config = ClaudeupConfig::load(&paths.config_file())?;
        debug!(state_dir = %paths.state_dir().display(), "opened config store");
        Ok(Self { paths, config })
    }

    #[must_use]
    pub fn paths(&self) -> &ClaudeupPaths {
        &self.paths
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.config.preferences
    }

    /// Profile active at user scope
    #[must_use]
    pub fn user_active(&self) -> Option<&str> {
        self.config.active_profile.as_deref().filter(|p| !p.is_empty())
    }

    /// Read the project registry fresh from disk
    pub fn project_registry(&self) -> ProfileResult<ProjectRegistry> {
        ProjectRegistry::load(&self.paths.projects_file())
    }

    /// Move the active pointer of `scope` to `profile`, or clear it with `None`.
    ///
    /// Project scope writes `.claudeup.json` in `project`; local scope writes
    /// the registry entry for `project`.
    pub fn set_active(
        &mut self,
        scope: Scope,
        project: Option<&Path>,
        profile: Option<&str>,
    ) -> ProfileResult<()> {
        match scope {
            Scope::User => {
                self.config.active_profile = profile.map(str::to_string);
                self.config.save(&self.paths.config_file())?;
            }
            Scope::Project => {
                let dir = project.ok_or(ProfileError::ProjectRequired(scope))?;
                let path = normalize_dir(dir).join(PROJECT_CONFIG_FILE);
                match profile {
                    Some(name) => {
                        let mut config = ProjectConfig::load(&path)?
                            .unwrap_or_else(|| ProjectConfig::new(name));
                        config.profile = name.to_string();
                        config.applied_at = Some(chrono::Utc::now());
                        config.save(&path)?;
                    }
                    None if path.is_file() => remove_project_config(&path)?,
                    None => {}
                }
            }
            Scope::Local => {
                let dir = project.ok_or(ProfileError::ProjectRequired(scope))?;
                let mut registry = self.project_registry()?;
                match profile {
                    Some(name) => registry.set(dir, name),
                    None => {
                        registry.remove(dir);
                    }
                }
                registry.save(&self.paths.projects_file())?;
            }
        }
        info!(%scope, profile = profile.unwrap_or("<none>"), "active profile updated");
        Ok(())
    }

    /// Clear every pointer that names `profile`.
    ///
    /// Covers the user pointer, all project registry entries and the project
    /// config found from `working_dir`. Returns the scopes that were cleared.
    pub fn clear_active_references(
        &mut self,
        profile: &str,
        working_dir: Option<&Path>,
    ) -> ProfileResult<Vec<Scope>> {
        let mut cleared = Vec::new();

        if self.user_active() == Some(profile) {
            self.set_active(Scope::User, None, None)?;
            cleared.push(Scope::User);
        }

        if let Some(dir) = working_dir {
            if let Some(found) = find_project_config(dir)? {
                if found.config.profile() == Some(profile) {
                    remove_project_config(&found.path)?;
                    cleared.push(Scope::Project);
                }
            }
        }

        let mut registry = self.project_registry()?;
        if registry.remove_profile(profile) > 0 {
            registry.save(&self.paths.projects_file())?;
            cleared.push(Scope::Local);
        }

        if !cleared.is_empty() {
            info!(profile, ?cleared, "cleared active profile pointers");
        }
        Ok(cleared)
    }

    /// Project root used for project and local scope operations: the
    /// directory holding the nearest `.claudeup.json`, else the nearest
    /// registered project, else `working_dir` itself
    pub fn project_root(&self, working_dir: &Path) -> ProfileResult<PathBuf> {
        if let Some(found) = find_project_config(working_dir)? {
            return Ok(found.root);
        }
        if let Some((root, _)) = self.project_registry()?.lookup(working_dir) {
            return Ok(root);
        }
        Ok(normalize_dir(working_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ConfigStore {
        ConfigStore::open(ClaudeupPaths::rooted(temp.path())).unwrap()
    }

    #[test]
    fn test_user_pointer_persists() {
        let temp = TempDir::new().unwrap();
        let mut s = store(&temp);
        s.set_active(Scope::User, None, Some("frontend")).unwrap();

        let reopened = store(&temp);
        assert_eq!(reopened.user_active(), Some("frontend"));
    }

    #[test]
    fn test_project_pointer_writes_and_removes_file() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        fs::create_dir_all(&project).unwrap();
        let mut s = store(&temp);

        s.set_active(Scope::Project, Some(&project), Some("backend")).unwrap();
        let file = project.join(PROJECT_CONFIG_FILE);
        assert!(file.is_file());

        s.set_active(Scope::Project, Some(&project), None).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_local_scope_requires_project() {
        let temp = TempDir::new().unwrap();
        let mut s = store(&temp);
        let err = s.set_active(Scope::Local, None, Some("x")).unwrap_err();
        assert!(matches!(err, ProfileError::ProjectRequired(Scope::Local)));
    }

    #[test]
    fn test_clear_active_references_covers_every_scope() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        let other = temp.path().join("other");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&other).unwrap();
        let mut s = store(&temp);

        s.set_active(Scope::User, None, Some("gone")).unwrap();
        s.set_active(Scope::Project, Some(&project), Some("gone")).unwrap();
        s.set_active(Scope::Local, Some(&other), Some("gone")).unwrap();

        let cleared = s.clear_active_references("gone", Some(&project)).unwrap();
        assert_eq!(cleared, vec![Scope::User, Scope::Project, Scope::Local]);
        assert_eq!(s.user_active(), None);
        assert!(!project.join(PROJECT_CONFIG_FILE).exists());
        assert!(s.project_registry().unwrap().projects.is_empty());
    }

    #[test]
    fn test_clear_leaves_other_profiles_alone() {
        let temp = TempDir::new().unwrap();
        let mut s = store(&temp);
        s.set_active(Scope::User, None, Some("keep")).unwrap();
        let cleared = s.clear_active_references("gone", None).unwrap();
        assert!(cleared.is_empty());
        assert_eq!(s.user_active(), Some("keep"));
    }
}
