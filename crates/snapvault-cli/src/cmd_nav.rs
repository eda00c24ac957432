use anyhow::{Context, Result};
use snapvault::VersionId;
use std::path::Path;

use crate::host::open_vault;

pub fn checkout(file: &Path, id: VersionId) -> Result<()> {
    let mut vault = open_vault(file)?;
    let snapshot = vault
        .checkout(id, false)
        .with_context(|| format!("checkout of {} failed", id))?;
    println!("{}", snapshot.display());
    Ok(())
}

pub fn restore(file: &Path) -> Result<()> {
    let mut vault = open_vault(file)?;
    let parent = vault
        .restore()
        .with_context(|| format!("restore from {} failed", file.display()))?;
    println!("Restored {}", parent.display());
    Ok(())
}

pub fn parent(file: &Path) -> Result<()> {
    let mut vault = open_vault(file)?;
    let parent = vault.open_parent()?;
    println!("{}", parent.display());
    Ok(())
}

pub fn fork(file: &Path) -> Result<()> {
    let mut vault = open_vault(file)?;
    let target = vault
        .fork(false)
        .with_context(|| format!("fork of {} failed", file.display()))?;
    println!("Forked to {}", target.display());
    Ok(())
}
