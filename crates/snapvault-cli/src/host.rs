//! A plain-file document host: the "document" is whatever file the user
//! points the CLI at, and every save is a byte copy. No asset model, no
//! object model — those capabilities stay at their unsupported defaults.

use anyhow::{Context, Result, bail};
use snapvault_engine::{Vault, VaultConfig};
use snapvault_host::{DocumentHost, HostError};
use std::path::{Path, PathBuf};

pub struct FsHost {
    current: Option<PathBuf>,
}

impl FsHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: Some(path.into()),
        }
    }

    fn current(&self) -> snapvault_host::Result<&Path> {
        self.current
            .as_deref()
            .ok_or(HostError::Unsupported("no document"))
    }
}

impl DocumentHost for FsHost {
    fn current_path(&self) -> Option<PathBuf> {
        self.current.clone()
    }

    /// A file on disk has no unsaved in-memory state.
    fn is_dirty(&self) -> bool {
        false
    }

    fn save_in_place(&mut self) -> snapvault_host::Result<()> {
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> snapvault_host::Result<()> {
        std::fs::copy(self.current()?, path)?;
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn save_as_copy(&mut self, path: &Path) -> snapvault_host::Result<()> {
        std::fs::copy(self.current()?, path)?;
        Ok(())
    }

    fn open(&mut self, path: &Path) -> snapvault_host::Result<()> {
        if !path.exists() {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            )));
        }
        self.current = Some(path.to_path_buf());
        Ok(())
    }
}

/// Build a vault for the given document, picking up the per-project
/// `config.json` next to the manifest when one exists.
pub fn open_vault(file: &Path) -> Result<Vault<FsHost>> {
    if !file.exists() {
        bail!("no such document: {}", file.display());
    }
    let file = file
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", file.display()))?;

    let live = snapvault::layout::parent_from_snapshot(&file).unwrap_or_else(|| file.clone());
    let root = snapvault::layout::history_root(&live);
    let config = VaultConfig::load_or_default(&root.join("config.json"));

    Ok(Vault::new(FsHost::new(file)).with_config(config))
}
