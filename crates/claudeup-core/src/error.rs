//! Error types for profile operations
//!
//! Every message names the next step the user can take.

use claudeup_host::{HostError, Scope};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors that can occur during profile operations
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No built-in or user profile with this name
    #[error("Profile '{0}' not found. Run 'claudeup profile list' to see available profiles")]
    NotFound(String),

    /// A plugin, extension or other named item does not exist
    #[error("{kind} '{name}' not found")]
    ItemNotFound { kind: String, name: String },

    /// `current` was requested but nothing is active
    #[error("No profile is active here. Run 'claudeup profile apply <name>' first")]
    NoActiveProfile,

    /// Save would overwrite an existing user profile
    #[error("Profile '{0}' already exists. Use --force to overwrite it")]
    AlreadyExists(String),

    /// Built-in profiles cannot be deleted
    #[error("{}", cannot_delete_message(.name, *.customized))]
    CannotDelete { name: String, customized: bool },

    /// Restore target is not a built-in profile
    #[error("'{0}' is not a built-in profile, so there is nothing to restore. Use 'claudeup profile delete {0}' to remove it")]
    NotBuiltIn(String),

    /// Restore target has no user overlay
    #[error("Built-in profile '{0}' has no customizations to restore")]
    NoCustomization(String),

    /// Scope string outside {user, project, local}
    #[error("Invalid scope '{0}'. Valid scopes: user, project, local")]
    InvalidScope(String),

    /// Conflicting listing filters
    #[error("--{first} and --{second} are mutually exclusive")]
    MutuallyExclusiveFlags {
        first: &'static str,
        second: &'static str,
    },

    /// Profile document uses both the flat and the per-scope schema
    #[error("Profile '{0}' mixes top-level 'plugins'/'mcpServers' with 'perScope'. Move everything under 'perScope'")]
    MixedSchema(String),

    /// Profile document is structurally invalid
    #[error("Profile '{name}' is invalid: {reason}")]
    InvalidProfile { name: String, reason: String },

    /// Profile name cannot be used as a file name
    #[error("Invalid profile name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Project or local scope used outside a project
    #[error("{0} scope requires a project directory")]
    ProjectRequired(Scope),

    /// JSON parse error
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from a host document
    #[error(transparent)]
    Host(HostError),
}

fn cannot_delete_message(name: &str, customized: bool) -> String {
    if customized {
        format!(
            "Cannot delete built-in profile '{name}'. To drop your customizations use 'claudeup profile restore {name}'"
        )
    } else {
        format!("Cannot delete built-in profile '{name}'. Built-in profiles are read-only")
    }
}

impl ProfileError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::ItemNotFound { .. } | Self::NoActiveProfile => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::CannotDelete { .. } => "CANNOT_DELETE",
            Self::NotBuiltIn(_) => "NOT_BUILT_IN",
            Self::NoCustomization(_) => "NO_CUSTOMIZATION",
            Self::InvalidScope(_) => "INVALID_SCOPE",
            Self::MutuallyExclusiveFlags { .. } => "MUTUALLY_EXCLUSIVE_FLAGS",
            Self::MixedSchema(_) | Self::InvalidProfile { .. } => "INVALID_PROFILE",
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::ProjectRequired(_) => "PROJECT_REQUIRED",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Host(_) => "HOST_ERROR",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<HostError> for ProfileError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InvalidScope(s) => Self::InvalidScope(s),
            HostError::ProjectRequired(scope) => Self::ProjectRequired(scope),
            other => Self::Host(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_delete_names_restore_for_customized() {
        let err = ProfileError::CannotDelete {
            name: "frontend".to_string(),
            customized: true,
        };
        assert!(err.to_string().contains("claudeup profile restore frontend"));

        let err = ProfileError::CannotDelete {
            name: "frontend".to_string(),
            customized: false,
        };
        assert!(!err.to_string().contains("restore"));
    }

    #[test]
    fn test_not_built_in_names_delete() {
        let err = ProfileError::NotBuiltIn("mine".to_string());
        assert!(err.to_string().contains("claudeup profile delete mine"));
        assert_eq!(err.code(), "NOT_BUILT_IN");
    }

    #[test]
    fn test_host_scope_errors_map_to_profile_taxonomy() {
        let err: ProfileError = HostError::InvalidScope("global".to_string()).into();
        assert!(matches!(err, ProfileError::InvalidScope(ref s) if s == "global"));
    }

    #[test]
    fn test_mutually_exclusive_names_both_flags() {
        let err = ProfileError::MutuallyExclusiveFlags {
            first: "enabled",
            second: "disabled",
        };
        let msg = err.to_string();
        assert!(msg.contains("--enabled") && msg.contains("--disabled"));
    }
}
