//! Profile application
//!
//! Diffs a profile's declared state against live state and writes only
//! what differs. Re-applying an unchanged profile yields no actions.

pub mod display;
pub mod engine;
pub mod installer;
mod plan;

use crate::profile::SecretRequirement;
use crate::registry::Category;
use claudeup_host::{MarketplaceSource, Scope};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub use engine::ApplyEngine;
pub use installer::{ClaudeCli, InstallError, Installer};

/// Apply behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Also disable/remove what is live at the scope but not declared
    pub replace: bool,
}

/// One idempotent change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    AddMarketplace { source: MarketplaceSource },
    InstallPlugin { plugin: String, scope: Scope },
    EnablePlugin { plugin: String, scope: Scope },
    DisablePlugin { plugin: String, scope: Scope },
    WriteMcpServer { name: String, scope: Scope },
    RemoveMcpServer { name: String, scope: Scope },
    EnableExtension { category: Category, item: String },
    DisableExtension { category: Category, item: String },
}

impl Action {
    /// Whether the action is carried out by the [`Installer`]
    #[must_use]
    pub fn needs_installer(&self) -> bool {
        matches!(self, Self::AddMarketplace { .. } | Self::InstallPlugin { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddMarketplace { source } => write!(f, "add marketplace {source}"),
            Self::InstallPlugin { plugin, scope } => write!(f, "install plugin {plugin} ({scope})"),
            Self::EnablePlugin { plugin, scope } => write!(f, "enable plugin {plugin} ({scope})"),
            Self::DisablePlugin { plugin, scope } => write!(f, "disable plugin {plugin} ({scope})"),
            Self::WriteMcpServer { name, scope } => write!(f, "write MCP server {name} ({scope})"),
            Self::RemoveMcpServer { name, scope } => write!(f, "remove MCP server {name} ({scope})"),
            Self::EnableExtension { category, item } => write!(f, "enable {category} {item}"),
            Self::DisableExtension { category, item } => write!(f, "disable {category} {item}"),
        }
    }
}

/// An action the installer could not carry out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub action: Action,
    pub message: String,
}

/// Line diff of a document that would change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDiff {
    pub path: PathBuf,
    pub diff: String,
}

/// Outcome of a plan or apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub profile: String,
    pub scope: Scope,
    /// Project directory for project and local scope
    pub project: Option<PathBuf>,
    /// Profile active at the scope before this apply
    pub previous: Option<String>,
    /// Whether live state needed any change
    pub changed: bool,
    pub actions: Vec<Action>,
    pub failures: Vec<ActionFailure>,
    pub warnings: Vec<String>,
    /// Secrets the declared MCP servers expect, for an external resolver
    pub secrets: Vec<SecretRequirement>,
    /// Only filled by dry runs
    pub diffs: Vec<DocumentDiff>,
}
