use snapvault::LayoutError;
use snapvault_host::HostError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Every way a guarded action can fail.
///
/// Surfaced variants carry the action name and the attempted path so callers
/// can translate straight into user feedback without re-deriving context.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{action}: cancelled")]
    Cancelled { action: &'static str },

    #[error("{action}: not found: {path}")]
    NotFound {
        action: &'static str,
        path: PathBuf,
    },

    #[error("{action}: refusing path outside the history directory: {path}")]
    Security {
        action: &'static str,
        path: PathBuf,
    },

    #[error("{action}: the open document is a snapshot; fork it or restore the parent instead")]
    SnapshotGuard { action: &'static str },

    #[error("the open document has unsaved changes")]
    Dirty,

    #[error("version ceiling reached")]
    VersionLimit,

    #[error("invalid manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("host: {0}")]
    Host(#[from] HostError),

    #[error("{action}: I/O error at {path}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not enough disk space under {path}: {available} bytes free")]
    DiskFull { path: PathBuf, available: u64 },

    #[error("{action}: {reason}")]
    Conflict {
        action: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        EngineError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn conflict(action: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Conflict {
            action,
            reason: reason.into(),
        }
    }
}

impl From<LayoutError> for EngineError {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::VersionLimit => EngineError::VersionLimit,
            LayoutError::ForkCollision => {
                EngineError::conflict("fork", "no collision-free target name")
            }
        }
    }
}
