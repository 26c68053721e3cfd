//! Local file-based extensions
//!
//! Items live in `~/.claudeup/local/<category>/`. Enabling an item records
//! it in the registry and links it into Claude Code's `<category>/`
//! directory; disabling removes the link.

use crate::error::{ProfileError, ProfileResult};
use crate::paths::ClaudeupPaths;
use crate::registry::{Category, EnabledFilter, EnabledRegistry};
use claudeup_host::frontmatter::read_meta;
use claudeup_host::HostLayout;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An item found in local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalItem {
    pub category: Category,
    /// Identifier: directory name, or file name without extension
    pub name: String,
    pub path: PathBuf,
}

impl LocalItem {
    fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// Listing row for `ext list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionRow {
    pub category: Category,
    pub name: String,
    pub enabled: bool,
    pub description: Option<String>,
}

/// Local extension storage and its links into the host config directory
#[derive(Debug, Clone)]
pub struct LocalExtensions {
    local_dir: PathBuf,
    host: HostLayout,
}

impl LocalExtensions {
    #[must_use]
    pub fn new(paths: &ClaudeupPaths) -> Self {
        Self {
            local_dir: paths.local_dir(),
            host: paths.host().clone(),
        }
    }

    fn category_dir(&self, category: Category) -> PathBuf {
        self.local_dir.join(category.as_str())
    }

    fn link_dir(&self, category: Category) -> PathBuf {
        self.host.extension_dir(category.as_str())
    }

    /// Items present in local storage, sorted by name
    pub fn discover(&self, category: Category) -> ProfileResult<Vec<LocalItem>> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut items = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| ProfileError::io(&dir, e))? {
            let entry = entry.map_err(|e| ProfileError::io(&dir, e))?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            let name = if path.is_dir() {
                file_name.to_string()
            } else {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(file_name)
                    .to_string()
            };
            items.push(LocalItem {
                category,
                name,
                path,
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(%category, count = items.len(), "discovered local extensions");
        Ok(items)
    }

    /// Look up one item; unknown items fail with `ItemNotFound`
    pub fn find(&self, category: Category, name: &str) -> ProfileResult<LocalItem> {
        self.discover(category)?
            .into_iter()
            .find(|item| item.name == name)
            .ok_or_else(|| ProfileError::ItemNotFound {
                kind: format!("{category} item"),
                name: name.to_string(),
            })
    }

    fn link_path(&self, item: &LocalItem) -> Option<PathBuf> {
        item.file_name().map(|f| self.link_dir(item.category).join(f))
    }

    /// Whether the item is linked into the host config directory
    #[must_use]
    pub fn is_linked(&self, item: &LocalItem) -> bool {
        self.link_path(item)
            .is_some_and(|p| p.symlink_metadata().is_ok())
    }

    /// Link an item into the host config directory; returns whether a link
    /// was created
    pub fn link(&self, item: &LocalItem) -> ProfileResult<bool> {
        let Some(target) = self.link_path(item) else {
            return Ok(false);
        };
        if target.symlink_metadata().is_ok() {
            return Ok(false);
        }
        let dir = self.link_dir(item.category);
        fs::create_dir_all(&dir).map_err(|e| ProfileError::io(&dir, e))?;
        place_link(&item.path, &target)?;
        info!(category = %item.category, item = %item.name, "linked extension");
        Ok(true)
    }

    /// Remove an item's link; returns whether one was removed. Files that
    /// are not links into local storage are left alone.
    pub fn unlink(&self, item: &LocalItem) -> ProfileResult<bool> {
        let Some(target) = self.link_path(item) else {
            return Ok(false);
        };
        let Ok(meta) = target.symlink_metadata() else {
            return Ok(false);
        };
        if cfg!(unix) && !meta.file_type().is_symlink() {
            warn!(path = %target.display(), "not a claudeup link, leaving it in place");
            return Ok(false);
        }
        remove_link(&target, meta.is_dir())?;
        info!(category = %item.category, item = %item.name, "unlinked extension");
        Ok(true)
    }

    /// Enable an item: registry entry plus link
    pub fn enable(
        &self,
        registry: &mut EnabledRegistry,
        category: Category,
        name: &str,
    ) -> ProfileResult<bool> {
        let item = self.find(category, name)?;
        let recorded = registry.set_enabled(category, name, true);
        let linked = self.link(&item)?;
        Ok(recorded || linked)
    }

    /// Disable an item: registry entry plus link removal
    pub fn disable(
        &self,
        registry: &mut EnabledRegistry,
        category: Category,
        name: &str,
    ) -> ProfileResult<bool> {
        let item = self.find(category, name)?;
        let recorded = registry.set_enabled(category, name, false);
        let unlinked = self.unlink(&item)?;
        Ok(recorded || unlinked)
    }

    /// Rows for the listed categories, filtered by enablement
    pub fn rows(
        &self,
        categories: &[Category],
        registry: &EnabledRegistry,
        filter: EnabledFilter,
    ) -> ProfileResult<Vec<ExtensionRow>> {
        let mut rows = Vec::new();
        for &category in categories {
            for item in self.discover(category)? {
                let enabled = registry.is_enabled(category, &item.name);
                if !filter.matches(enabled) {
                    continue;
                }
                let description = match read_meta(&item.path) {
                    Ok(meta) => meta.description,
                    Err(e) => {
                        debug!(path = %item.path.display(), error = %e, "no frontmatter");
                        None
                    }
                };
                rows.push(ExtensionRow {
                    category,
                    name: item.name,
                    enabled,
                    description,
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(unix)]
fn place_link(source: &Path, target: &Path) -> ProfileResult<()> {
    std::os::unix::fs::symlink(source, target).map_err(|e| ProfileError::io(target, e))
}

#[cfg(not(unix))]
fn place_link(source: &Path, target: &Path) -> ProfileResult<()> {
    if source.is_dir() {
        for entry in walkdir::WalkDir::new(source).into_iter().filter_map(Result::ok) {
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let dest = target.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| ProfileError::io(&dest, e))?;
            } else {
                fs::copy(entry.path(), &dest).map_err(|e| ProfileError::io(&dest, e))?;
            }
        }
        Ok(())
    } else {
        fs::copy(source, target)
            .map(|_| ())
            .map_err(|e| ProfileError::io(target, e))
    }
}

fn remove_link(target: &Path, is_dir: bool) -> ProfileResult<()> {
    let result = if is_dir {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };
    result.map_err(|e| ProfileError::io(target, e))
}
