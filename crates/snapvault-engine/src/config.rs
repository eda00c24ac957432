//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::autosave::AutosaveSettings;

/// Tunables for a [`Vault`](crate::Vault).
///
/// Serializable so hosts can persist it next to their own preferences; the
/// CLI keeps a `config.json` beside the manifest. Unset fields fall back to
/// the defaults below on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Unlocked, non-autosave versions to keep when pruning.
    pub max_keep: usize,

    /// Run the retention pass after every manual commit.
    pub prune_on_commit: bool,

    /// Write per-object summaries next to each snapshot.
    pub record_objects: bool,

    /// Route deletions through the platform trash instead of removing
    /// directories outright.
    pub use_trash: bool,

    /// Refuse to commit when the free space left after the copy would fall
    /// below this many bytes.
    pub min_free_bytes: u64,

    pub autosave: AutosaveSettings,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_keep: 25,
            prune_on_commit: true,
            record_objects: true,
            use_trash: true,
            min_free_bytes: 64 * 1024 * 1024,
            autosave: AutosaveSettings::default(),
        }
    }
}

impl VaultConfig {
    pub fn with_max_keep(mut self, max_keep: usize) -> Self {
        self.max_keep = max_keep.max(1);
        self
    }

    pub fn with_prune_on_commit(mut self, on: bool) -> Self {
        self.prune_on_commit = on;
        self
    }

    pub fn with_record_objects(mut self, on: bool) -> Self {
        self.record_objects = on;
        self
    }

    pub fn with_use_trash(mut self, on: bool) -> Self {
        self.use_trash = on;
        self
    }

    pub fn with_autosave(mut self, autosave: AutosaveSettings) -> Self {
        self.autosave = autosave;
        self
    }

    /// Read a config file, falling back to defaults when it is missing or
    /// unreadable. Malformed content is reported via `tracing` and ignored;
    /// a broken preferences file should never block a commit.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist as pretty JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}
