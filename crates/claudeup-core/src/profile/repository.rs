//! Profile repository
//!
//! A single table keyed by name. Each entry may carry a bundled built-in
//! definition and a user overlay file; the overlay wins when both exist.

use super::builtin::load_builtins;
use super::document::ProfileDocument;
use super::name::{name_from_path, profile_path, validate_name, CURRENT};
use super::types::Profile;
use crate::error::{ProfileError, ProfileResult};
use crate::presentation::{build_listing, ProfileListing, ProfileSummary};
use crate::store::ConfigStore;
use claudeup_host::{write_json_atomic, Scope};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One row of the name table
#[derive(Debug, Clone)]
pub struct ProfileEntry<'a> {
    pub name: String,
    pub builtin: Option<&'a Profile>,
    pub overlay: Option<PathBuf>,
}

impl ProfileEntry<'_> {
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }

    #[must_use]
    pub fn is_customized(&self) -> bool {
        self.builtin.is_some() && self.overlay.is_some()
    }
}

/// Built-in and user profiles
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    profiles_dir: PathBuf,
    builtins: BTreeMap<String, Profile>,
}

impl ProfileRepository {
    /// Repository over `profiles_dir` with the bundled built-ins
    pub fn new(profiles_dir: PathBuf) -> ProfileResult<Self> {
        Ok(Self::with_builtins(profiles_dir, load_builtins()?))
    }

    /// Repository with an explicit set of built-ins
    #[must_use]
    pub fn with_builtins(profiles_dir: PathBuf, builtins: Vec<Profile>) -> Self {
        Self {
            profiles_dir,
            builtins: builtins.into_iter().map(|p| (p.name.clone(), p)).collect(),
        }
    }

    #[must_use]
    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    fn overlay_path(&self, name: &str) -> Option<PathBuf> {
        let path = profile_path(&self.profiles_dir, name);
        path.is_file().then_some(path)
    }

    /// Entry for one name, `None` when neither definition exists
    pub fn entry(&self, name: &str) -> ProfileResult<Option<ProfileEntry<'_>>> {
        validate_name(name)?;
        let builtin = self.builtins.get(name);
        let overlay = self.overlay_path(name);
        if builtin.is_none() && overlay.is_none() {
            return Ok(None);
        }
        Ok(Some(ProfileEntry {
            name: name.to_string(),
            builtin,
            overlay,
        }))
    }

    /// Full name table, read fresh from disk
    pub fn entries(&self) -> ProfileResult<Vec<ProfileEntry<'_>>> {
        let mut table: BTreeMap<String, ProfileEntry<'_>> = self
            .builtins
            .iter()
            .map(|(name, profile)| {
                (
                    name.clone(),
                    ProfileEntry {
                        name: name.clone(),
                        builtin: Some(profile),
                        overlay: None,
                    },
                )
            })
            .collect();

        if self.profiles_dir.is_dir() {
            for entry in WalkDir::new(&self.profiles_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                let Some(name) = name_from_path(&self.profiles_dir, entry.path()) else {
                    continue;
                };
                if let Err(e) = validate_name(&name) {
                    warn!(path = %entry.path().display(), error = %e, "skipping profile file");
                    continue;
                }
                table
                    .entry(name.clone())
                    .or_insert_with(|| ProfileEntry {
                        name,
                        builtin: None,
                        overlay: None,
                    })
                    .overlay = Some(entry.path().to_path_buf());
            }
        }

        debug!(count = table.len(), "indexed profiles");
        Ok(table.into_values().collect())
    }

    /// Effective definition: the overlay if present, else the built-in
    pub fn get(&self, name: &str) -> ProfileResult<Profile> {
        let entry = self
            .entry(name)?
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        match (&entry.overlay, entry.builtin) {
            (Some(path), _) => self.load_overlay(name, path),
            (None, Some(builtin)) => Ok(builtin.clone()),
            (None, None) => Err(ProfileError::NotFound(name.to_string())),
        }
    }

    fn load_overlay(&self, name: &str, path: &Path) -> ProfileResult<Profile> {
        if name == CURRENT {
            warn!(
                "a user profile is named '{CURRENT}', which is reserved for the active profile; rename it"
            );
        }
        let text = fs::read_to_string(path).map_err(|e| ProfileError::io(path, e))?;
        let document = ProfileDocument::parse(&text).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        document.into_profile(name)
    }

    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// A built-in with a user overlay present
    #[must_use]
    pub fn is_customized(&self, name: &str) -> bool {
        self.is_builtin(name) && validate_name(name).is_ok() && self.overlay_path(name).is_some()
    }

    /// One summary per name, sorted by name
    pub fn summaries(&self) -> ProfileResult<Vec<ProfileSummary>> {
        let mut summaries = Vec::new();
        for entry in self.entries()? {
            let description = match self.get(&entry.name) {
                Ok(profile) => profile.description,
                Err(e) => {
                    warn!(profile = %entry.name, error = %e, "unreadable profile");
                    String::new()
                }
            };
            summaries.push(ProfileSummary {
                customized: entry.is_customized(),
                builtin: entry.is_builtin(),
                name: entry.name,
                description,
            });
        }
        Ok(summaries)
    }

    /// Grouped listing; hidden profiles only with `include_hidden`
    pub fn list(&self, include_hidden: bool) -> ProfileResult<ProfileListing> {
        Ok(build_listing(self.summaries()?, include_hidden))
    }

    /// Save a new user profile.
    ///
    /// Fails with `AlreadyExists` if a user definition exists. Writing over a
    /// built-in name without an overlay creates its customization.
    pub fn save(&self, profile: &Profile) -> ProfileResult<PathBuf> {
        validate_name(&profile.name)?;
        if self.overlay_path(&profile.name).is_some() {
            return Err(ProfileError::AlreadyExists(profile.name.clone()));
        }
        self.write(profile)
    }

    /// Save a user profile, overwriting any existing user definition
    pub fn replace(&self, profile: &Profile) -> ProfileResult<PathBuf> {
        validate_name(&profile.name)?;
        self.write(profile)
    }

    fn write(&self, profile: &Profile) -> ProfileResult<PathBuf> {
        if profile.name == CURRENT {
            warn!("saving a profile named '{CURRENT}', which is reserved for the active profile; consider another name");
        }
        let path = profile_path(&self.profiles_dir, &profile.name);
        write_json_atomic(&path, &ProfileDocument::from(profile))?;
        info!(profile = %profile.name, path = %path.display(), "saved profile");
        Ok(path)
    }

    /// Delete a user profile and clear every active pointer naming it.
    ///
    /// Built-ins cannot be deleted; a customized built-in is reverted with
    /// [`ProfileRepository::restore`] instead. Returns the scopes whose
    /// pointer was cleared.
    pub fn delete(
        &self,
        name: &str,
        store: &mut ConfigStore,
        working_dir: Option<&Path>,
    ) -> ProfileResult<Vec<Scope>> {
        let entry = self
            .entry(name)?
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        if entry.is_builtin() {
            return Err(ProfileError::CannotDelete {
                name: name.to_string(),
                customized: entry.is_customized(),
            });
        }
        let Some(path) = entry.overlay else {
            return Err(ProfileError::NotFound(name.to_string()));
        };
        self.remove_file(&path)?;
        info!(profile = name, "deleted profile");
        store.clear_active_references(name, working_dir)
    }

    /// Remove the user overlay of a built-in, reverting to the bundled content
    pub fn restore(&self, name: &str) -> ProfileResult<()> {
        validate_name(name)?;
        if !self.is_builtin(name) {
            return Err(ProfileError::NotBuiltIn(name.to_string()));
        }
        let path = self
            .overlay_path(name)
            .ok_or_else(|| ProfileError::NoCustomization(name.to_string()))?;
        self.remove_file(&path)?;
        info!(profile = name, "restored built-in profile");
        Ok(())
    }

    /// Remove a profile file and any group directories left empty
    fn remove_file(&self, path: &Path) -> ProfileResult<()> {
        fs::remove_file(path).map_err(|e| ProfileError::io(path, e))?;
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.profiles_dir || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(())
    }
}
