use anyhow::{Context, Result};
use snapvault::{VersionId, VersionTag};
use std::path::Path;

use crate::host::open_vault;

pub fn prune(file: &Path, max_keep: Option<usize>) -> Result<()> {
    let mut vault = open_vault(file)?;
    if let Some(keep) = max_keep {
        vault.config_mut().max_keep = keep.max(1);
    }
    let removed = vault.prune()?;
    println!("Pruned {} versions", removed);
    Ok(())
}

pub fn tag(file: &Path, id: VersionId, tag: VersionTag) -> Result<()> {
    let mut vault = open_vault(file)?;
    vault.set_tag(id, tag)?;
    println!("Tagged {} as {}", id, tag);
    Ok(())
}

pub fn set_lock(file: &Path, id: VersionId, locked: bool) -> Result<()> {
    let mut vault = open_vault(file)?;
    vault.set_protection(id, locked)?;
    println!("{} {}", if locked { "Locked" } else { "Unlocked" }, id);
    Ok(())
}

pub fn note(file: &Path, id: VersionId, text: String) -> Result<()> {
    let mut vault = open_vault(file)?;
    vault.set_note(id, text)?;
    println!("Noted {}", id);
    Ok(())
}

pub fn delete(file: &Path, id: &str, no_trash: bool) -> Result<()> {
    let mut vault = open_vault(file)?;
    if no_trash {
        vault.config_mut().use_trash = false;
    }
    vault
        .delete_version_by_id(id)
        .with_context(|| format!("could not delete {}", id))?;
    println!("Deleted {}", id);
    Ok(())
}

pub fn link(file: &Path, source: &Path) -> Result<()> {
    let mut vault = open_vault(file)?;
    let root = vault
        .link_history(source)
        .with_context(|| format!("could not link {}", source.display()))?;
    println!("Linked history at {}", root.display());
    Ok(())
}
