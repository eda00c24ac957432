#![doc = include_str!("../README.md")]

pub mod actions;
pub mod autosave;
pub mod config;
pub mod error;
pub mod objects;
pub mod remap;
pub mod retention;
pub mod safety;
pub mod snapshots;
pub mod store;
pub mod supervisor;

pub use actions::{RescueSession, Vault, VaultStatus, get_free_disk_space};
pub use autosave::{AutosaveScheduler, AutosaveSettings, SkipReason, TickOutcome};
pub use config::VaultConfig;
pub use error::{EngineError, Result};
pub use safety::OsTrash;
pub use snapshots::{SnapshotRequest, SnapshotStore, THUMBNAIL_MAX_DIM};
pub use store::ManifestStore;
pub use supervisor::{Supervisor, SupervisorEvent, TaskSpec};
