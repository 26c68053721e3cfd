//! Scope resolution of the active profile
//!
//! Each scope is resolved independently and fresh on every call:
//! - user: the pointer in `config.json`
//! - project: the nearest `.claudeup.json` at or above the directory
//! - local: the nearest registered project, only when no project file exists
//!
//! The effective profile is project, else local, else user.

use crate::error::{ProfileError, ProfileResult};
use crate::profile::CURRENT;
use crate::project::find_project_config;
use crate::store::ConfigStore;
use claudeup_host::Scope;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Active profile per scope for one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveProfiles {
    pub user: Option<String>,
    pub project: Option<String>,
    pub local: Option<String>,
    /// Directory holding the `.claudeup.json` that answered project scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Registered project path that answered local scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_root: Option<PathBuf>,
}

impl ActiveProfiles {
    #[must_use]
    pub fn get(&self, scope: Scope) -> Option<&str> {
        match scope {
            Scope::User => self.user.as_deref(),
            Scope::Project => self.project.as_deref(),
            Scope::Local => self.local.as_deref(),
        }
    }

    /// The profile in effect and the scope it comes from
    #[must_use]
    pub fn effective(&self) -> Option<(Scope, &str)> {
        let mut scopes = Scope::ALL;
        scopes.sort_by_key(|s| std::cmp::Reverse(s.precedence()));
        scopes
            .into_iter()
            .find_map(|scope| self.get(scope).map(|name| (scope, name)))
    }
}

/// Result of asking for one scope only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeLookup {
    Active(String),
    /// Nothing active at that scope; carries the message to show
    NotFound(String),
}

/// Resolves active profiles against a config store
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver<'a> {
    store: &'a ConfigStore,
}

impl<'a> ScopeResolver<'a> {
    #[must_use]
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Active profile at every scope for `working_dir`
    pub fn resolve_active(&self, working_dir: &Path) -> ProfileResult<ActiveProfiles> {
        let mut active = ActiveProfiles {
            user: self.store.user_active().map(str::to_string),
            ..ActiveProfiles::default()
        };

        match find_project_config(working_dir)? {
            Some(found) => {
                active.project = found.config.profile().map(str::to_string);
                active.project_root = Some(found.root);
            }
            None => {
                let registry = self.store.project_registry()?;
                if let Some((root, entry)) = registry.lookup(working_dir) {
                    active.local = Some(entry.profile.clone()).filter(|p| !p.is_empty());
                    active.local_root = Some(root);
                }
            }
        }

        debug!(dir = %working_dir.display(), ?active, "resolved active profiles");
        Ok(active)
    }

    /// The effective profile name for `working_dir`
    pub fn effective(&self, working_dir: &Path) -> ProfileResult<Option<String>> {
        Ok(self
            .resolve_active(working_dir)?
            .effective()
            .map(|(_, name)| name.to_string()))
    }

    /// Resolve `current` to the effective profile; other names pass through
    pub fn resolve_name(&self, name: &str, working_dir: &Path) -> ProfileResult<String> {
        if name != CURRENT {
            return Ok(name.to_string());
        }
        self.effective(working_dir)?
            .ok_or(ProfileError::NoActiveProfile)
    }

    /// Look at one scope only. Never falls back to another scope; an empty
    /// scope is reported as a message, not an error.
    pub fn lookup(&self, working_dir: &Path, scope: Scope) -> ProfileResult<ScopeLookup> {
        let active = self.resolve_active(working_dir)?;
        Ok(match active.get(scope) {
            Some(name) => ScopeLookup::Active(name.to_string()),
            None => ScopeLookup::NotFound(format!("No profile active at {scope} scope")),
        })
    }
}

/// Parse a scope filter value
pub fn parse_scope(value: &str) -> ProfileResult<Scope> {
    Ok(value.parse::<Scope>()?)
}
