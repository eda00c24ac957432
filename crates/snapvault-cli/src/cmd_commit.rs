use anyhow::{Context, Result};
use snapvault::{VersionId, layout};
use snapvault_engine::{AutosaveScheduler, TickOutcome};
use std::path::Path;

use crate::host::open_vault;

pub fn commit(file: &Path, note: Option<String>, no_prune: bool, json: bool) -> Result<()> {
    let mut vault = open_vault(file)?;
    if no_prune {
        vault.config_mut().prune_on_commit = false;
    }

    let entry = vault
        .commit(note)
        .with_context(|| format!("commit failed for {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Committed {} ({} bytes){}",
            entry.id,
            entry.file_size,
            entry
                .note
                .as_deref()
                .map(|n| format!(" — {}", n))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// One scheduling decision, suitable for cron or a shell loop. The last
/// autosave time is recovered from the autosave blob's mtime so the interval
/// holds across invocations.
pub fn autosave_tick(file: &Path, interval: Option<u64>) -> Result<()> {
    let mut vault = open_vault(file)?;
    if let Some(minutes) = interval {
        vault.config_mut().autosave.interval_minutes = minutes.max(1);
    }
    vault.config_mut().autosave.enabled = true;

    let mut scheduler = AutosaveScheduler::new();
    if let Some(epoch) = last_autosave_epoch(file) {
        scheduler = scheduler.with_last_epoch(epoch);
    }

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    match scheduler.tick(&mut vault, now)? {
        TickOutcome::Saved(entry) => println!("Autosaved ({} bytes)", entry.file_size),
        TickOutcome::Skipped(reason) => println!("Skipped: {:?}", reason),
    }
    Ok(())
}

fn last_autosave_epoch(file: &Path) -> Option<u64> {
    let live = layout::parent_from_snapshot(file).unwrap_or_else(|| file.to_path_buf());
    let root = layout::history_root(&live);
    let ext = live.extension()?.to_str()?.to_string();
    let blob = layout::snapshot_path(&layout::version_dir(&root, VersionId::Autosave), &ext);
    let modified = std::fs::metadata(blob).ok()?.modified().ok()?;
    let epoch = modified
        .duration_since(std::time::UNIX_EPOCH)
        .ok()?
        .as_secs();
    Some(epoch)
}
