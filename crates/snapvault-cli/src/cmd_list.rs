use anyhow::Result;
use serde_json::json;
use snapvault::{VersionTag, query};
use std::path::Path;

use crate::host::open_vault;

pub fn list(
    file: &Path,
    tag: Option<VersionTag>,
    locked: bool,
    find: Option<&str>,
    json_out: bool,
) -> Result<()> {
    let vault = open_vault(file)?;
    let versions = vault.versions()?;

    let mut selected: Vec<&snapvault::VersionEntry> = versions.iter().collect();
    if let Some(tag) = tag {
        let matching = query::filter_by_tag(&versions, tag);
        selected.retain(|v| matching.iter().any(|m| m.id == v.id));
    }
    if locked {
        selected.retain(|v| v.is_protected);
    }
    if let Some(needle) = find {
        let matching = query::filter_by_note(&versions, needle);
        selected.retain(|v| matching.iter().any(|m| m.id == v.id));
    }

    if json_out {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        println!("No versions recorded for {}", file.display());
        return Ok(());
    }

    println!(
        "{:<10} {:<20} {:<11} {:<6} {:>12}  NOTE",
        "ID", "TIMESTAMP", "TAG", "LOCK", "SIZE"
    );
    for v in &selected {
        println!(
            "{:<10} {:<20} {:<11} {:<6} {:>12}  {}",
            v.id.to_string(),
            v.timestamp,
            v.tag.to_string(),
            if v.is_protected { "yes" } else { "" },
            v.file_size,
            v.note.as_deref().unwrap_or("")
        );
    }

    let summary = query::summarize(&versions);
    println!(
        "{} versions, {} locked, {} bytes{}",
        summary.count,
        summary.locked,
        summary.total_bytes,
        if summary.has_autosave { " (+autosave)" } else { "" }
    );
    Ok(())
}

pub fn status(file: &Path, json_out: bool) -> Result<()> {
    let vault = open_vault(file)?;
    let status = vault.status()?;

    if json_out {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "document": status.document,
                "snapshot_mode": status.snapshot_mode,
                "parent": status.parent,
                "history_root": status.history_root,
                "project_uuid": status.project_uuid,
                "version_count": status.version_count,
                "has_autosave": status.has_autosave,
            }))?
        );
        return Ok(());
    }

    if status.snapshot_mode {
        println!("{} is a checked-out snapshot", status.document.display());
        if let Some(parent) = &status.parent {
            println!("parent:  {}", parent.display());
        }
    } else {
        println!("{} is a live document", status.document.display());
    }
    println!("history: {}", status.history_root.display());
    println!(
        "versions: {}{}",
        status.version_count,
        if status.has_autosave { " (+autosave)" } else { "" }
    );
    if let Some(uuid) = &status.project_uuid {
        println!("project: {}", uuid);
    }
    Ok(())
}

pub fn objects(file: &Path, name: Option<&str>, records: bool, json_out: bool) -> Result<()> {
    let vault = open_vault(file)?;

    let names = match name {
        Some(n) => vec![n.to_string()],
        None => vault.known_objects()?,
    };
    if names.is_empty() {
        println!("No object records for {}", file.display());
        return Ok(());
    }

    let mut report = Vec::new();
    for n in &names {
        let history = vault.object_history(n, records)?;
        report.push((n.clone(), history));
    }

    if json_out {
        let value: serde_json::Value = report
            .iter()
            .map(|(n, h)| (n.clone(), serde_json::to_value(h).unwrap_or_default()))
            .collect::<serde_json::Map<String, serde_json::Value>>()
            .into();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (n, history) in &report {
        println!("{}", n);
        if history.is_empty() {
            println!("  (no recorded changes)");
        }
        for change in history {
            println!("  {:<10} {:<8} {}", change.version.to_string(), change.kind.to_string(), change.detail);
        }
    }
    Ok(())
}
