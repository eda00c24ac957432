#![doc = include_str!("../README.md")]

pub mod layout;
pub mod manifest;
pub mod objects;
pub mod query;
pub mod retention;

pub use layout::LayoutError;
pub use manifest::{
    Manifest, ParseVersionIdError, SCHEMA_VERSION, VersionEntry, VersionId, VersionTag,
};
pub use objects::{ChangeKind, ObjectChange, ObjectState, classify_history};
pub use retention::prune_plan;
