//! Profile names
//!
//! A name is a flat key. `/` separates presentation groups and maps to
//! sub-directories on disk; a segment starting with `_` hides the profile.

use crate::error::{ProfileError, ProfileResult};
use std::path::{Path, PathBuf};

/// Reserved name meaning "whatever is active here"
pub const CURRENT: &str = "current";

const PROFILE_EXTENSION: &str = "json";

/// Validate a name before it touches the filesystem
pub fn validate_name(name: &str) -> ProfileResult<()> {
    let invalid = |reason: &str| ProfileError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains('\0') {
        return Err(invalid("name contains a null byte"));
    }
    if name.contains('\\') {
        return Err(invalid("use '/' to separate groups"));
    }
    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(invalid("name contains an empty segment"));
        }
        if segment.starts_with('.') {
            return Err(invalid("segments cannot start with '.'"));
        }
    }
    Ok(())
}

/// Group key: everything before the last `/`
#[must_use]
pub fn group_prefix(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(prefix, _)| prefix)
}

/// Whether any segment of the name starts with `_`
#[must_use]
pub fn is_hidden(name: &str) -> bool {
    name.split('/').any(|segment| segment.starts_with('_'))
}

/// File holding the user definition of `name` under `profiles_dir`
#[must_use]
pub fn profile_path(profiles_dir: &Path, name: &str) -> PathBuf {
    let (parent, file) = match name.rsplit_once('/') {
        Some((parent, file)) => (Some(parent), file),
        None => (None, name),
    };
    parent
        .into_iter()
        .flat_map(|p| p.split('/'))
        .fold(profiles_dir.to_path_buf(), |dir, segment| dir.join(segment))
        .join(format!("{file}.{PROFILE_EXTENSION}"))
}

/// Inverse of [`profile_path`]: the name for a file under `profiles_dir`
#[must_use]
pub fn name_from_path(profiles_dir: &Path, path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
        return None;
    }
    let relative = path.strip_prefix(profiles_dir).ok()?.with_extension("");
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    Some(segments?.join("/"))
}
