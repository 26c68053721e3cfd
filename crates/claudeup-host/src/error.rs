//! Error types for host document access

use crate::types::Scope;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur while reading or patching host documents
#[derive(Error, Debug)]
pub enum HostError {
    /// IO error on a specific file
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document root (or a managed key) is not a JSON object
    #[error("Expected a JSON object in {0}")]
    NotAnObject(PathBuf),

    /// Scope string outside {user, project, local}
    #[error("Invalid scope '{0}'. Valid scopes: user, project, local")]
    InvalidScope(String),

    /// Project or local scope used without a project directory
    #[error("A project directory is required for {0} scope")]
    ProjectRequired(Scope),

    /// Home directory not found
    #[error("Home directory not found")]
    HomeNotFound,

    /// Failed to parse markdown frontmatter
    #[error("Failed to parse frontmatter: {0}")]
    Frontmatter(String),
}

impl HostError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}
