//! claudeup core - profile resolution and settings synchronization
//!
//! This crate provides the profile model and repository, the enabled-item
//! registry, scope resolution of the active profile, and the apply engine
//! that reconciles a profile into Claude Code's live configuration.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod apply;
pub mod config;
pub mod error;
pub mod extensions;
pub mod inventory;
pub mod paths;
pub mod presentation;
pub mod profile;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod store;

pub use claudeup_host;

pub use apply::{Action, ApplyEngine, ApplyOptions, ApplyResult, ClaudeCli, Installer};
pub use error::{ProfileError, ProfileResult};
pub use paths::ClaudeupPaths;
pub use profile::{Profile, ProfileRepository};
pub use registry::{Category, EnabledFilter, EnabledRegistry};
pub use resolver::{ActiveProfiles, ScopeResolver};
pub use store::ConfigStore;
