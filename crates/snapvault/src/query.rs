//! Filter and summary operations over manifest version lists.

use crate::manifest::{VersionEntry, VersionId, VersionTag};
use std::collections::HashMap;

/// Entries carrying the given tag.
///
/// # Examples
///
/// ```
/// use snapvault::{VersionEntry, VersionId, VersionTag, query};
///
/// let mut a = VersionEntry::new(VersionId::Numbered(1), "t");
/// a.tag = VersionTag::Milestone;
/// let b = VersionEntry::new(VersionId::Numbered(2), "t");
///
/// let versions = vec![a, b];
/// let milestones = query::filter_by_tag(&versions, VersionTag::Milestone);
/// assert_eq!(milestones.len(), 1);
/// assert_eq!(milestones[0].id, VersionId::Numbered(1));
/// ```
pub fn filter_by_tag(versions: &[VersionEntry], tag: VersionTag) -> Vec<&VersionEntry> {
    versions.iter().filter(|v| v.tag == tag).collect()
}

/// Locked entries.
pub fn protected(versions: &[VersionEntry]) -> Vec<&VersionEntry> {
    versions.iter().filter(|v| v.is_protected).collect()
}

/// Entries whose note contains `needle`, case-insensitively.
///
/// # Examples
///
/// ```
/// use snapvault::{VersionEntry, VersionId, query};
///
/// let versions = vec![
///     VersionEntry::new(VersionId::Numbered(1), "t").with_note("Blocking the dragon"),
///     VersionEntry::new(VersionId::Numbered(2), "t").with_note("Lighting pass"),
///     VersionEntry::new(VersionId::Numbered(3), "t"),
/// ];
/// let hits = query::filter_by_note(&versions, "dragon");
/// assert_eq!(hits.len(), 1);
/// ```
pub fn filter_by_note<'a>(versions: &'a [VersionEntry], needle: &str) -> Vec<&'a VersionEntry> {
    let needle = needle.to_lowercase();
    versions
        .iter()
        .filter(|v| {
            v.note
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Entries whose timestamp falls within `[start, end]`. Timestamps are the
/// manifest's local-time strings, so this is a lexicographic comparison —
/// fine for the fixed `YYYY-MM-DD HH:MM:SS` format.
pub fn filter_by_time_range<'a>(
    versions: &'a [VersionEntry],
    start: &str,
    end: &str,
) -> Vec<&'a VersionEntry> {
    versions
        .iter()
        .filter(|v| {
            let ts = v.timestamp.as_str();
            ts >= start && ts <= end
        })
        .collect()
}

/// Bytes across all snapshot blobs.
pub fn total_size(versions: &[VersionEntry]) -> u64 {
    versions.iter().map(|v| v.file_size).sum()
}

/// Build an id → entry lookup map.
pub fn entry_index(versions: &[VersionEntry]) -> HashMap<VersionId, &VersionEntry> {
    versions.iter().map(|v| (v.id, v)).collect()
}

/// The highest-numbered entry, ignoring the autosave slot.
pub fn newest(versions: &[VersionEntry]) -> Option<&VersionEntry> {
    versions
        .iter()
        .filter(|v| !v.id.is_autosave())
        .max_by_key(|v| v.id)
}

/// Aggregate numbers for a status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    /// Numbered versions, autosave excluded.
    pub count: usize,
    pub locked: usize,
    pub tagged: usize,
    pub has_autosave: bool,
    pub total_bytes: u64,
}

/// Summarize a version list in one pass.
pub fn summarize(versions: &[VersionEntry]) -> HistorySummary {
    let mut summary = HistorySummary {
        count: 0,
        locked: 0,
        tagged: 0,
        has_autosave: false,
        total_bytes: 0,
    };
    for v in versions {
        summary.total_bytes += v.file_size;
        if v.id.is_autosave() {
            summary.has_autosave = true;
            continue;
        }
        summary.count += 1;
        if v.is_protected {
            summary.locked += 1;
        }
        if v.tag != VersionTag::None {
            summary.tagged += 1;
        }
    }
    summary
}
