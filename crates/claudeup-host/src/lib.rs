//! claudeup host - access to Claude Code's live configuration
//!
//! This crate reads and patches the documents Claude Code owns: the
//! per-scope settings files, MCP server tables, the installed-plugins
//! registry and the known-marketplaces list. Documents are treated as
//! opaque JSON; only the keys claudeup manages are touched and every
//! write is an atomic replace.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod document;
pub mod error;
pub mod frontmatter;
pub mod layout;
pub mod mcp;
pub mod plugins;
pub mod settings;
pub mod types;

pub use document::{write_json_atomic, JsonDocument};
pub use error::{HostError, HostResult};
pub use layout::HostLayout;
pub use mcp::McpDocument;
pub use plugins::{InstallRecord, InstalledPlugins, KnownMarketplaces, MarketplaceSource, PluginStatus};
pub use settings::SettingsDocument;
pub use types::Scope;
