//! Profile model, storage and snapshots

pub mod builtin;
pub mod document;
pub mod name;
pub mod repository;
pub mod snapshot;
mod types;

pub use document::ProfileDocument;
pub use name::CURRENT;
pub use repository::{ProfileEntry, ProfileRepository};
pub use snapshot::snapshot;
pub use types::*;
