//! On-disk layout rules for history directories.
//!
//! Everything here is a pure function of paths and strings; no filesystem
//! access happens in this module. The one place a disk probe is needed —
//! collision-free fork naming — takes the probe as a closure so callers and
//! tests decide what "exists" means.

use std::path::{Path, PathBuf};

use crate::manifest::VersionId;

/// Numbered version ids stop here; allocation past the ceiling is an error.
pub const VERSION_CEILING: u32 = 999;

/// File name of the per-project index inside the history directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Advisory lock file name used by multi-process hosts.
pub const LOCK_FILE: &str = "manifest.lock";

const HISTORY_SUFFIX: &str = "_history";

/// Errors from pure layout computations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("version ceiling reached (v{VERSION_CEILING})")]
    VersionLimit,

    #[error("no collision-free fork name within {VERSION_CEILING} attempts")]
    ForkCollision,
}

// ============================================================================
// Directory and file naming
// ============================================================================

/// History directory for a document: `<parent>/.{stem}_history`.
pub fn history_root(doc_path: &Path) -> PathBuf {
    let stem = doc_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let parent = doc_path.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!(".{}{}", stem, HISTORY_SUFFIX))
}

/// Manifest path inside a history directory.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Lock file path inside a history directory.
pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

/// Directory holding one version's files.
pub fn version_dir(root: &Path, id: VersionId) -> PathBuf {
    root.join(id.to_string())
}

/// Extension given to snapshot blobs for a live extension, e.g. `blend` →
/// `blend_snapshot`. The distinct suffix keeps hosts and file managers from
/// mistaking a snapshot for the live document.
pub fn snapshot_ext(live_ext: &str) -> String {
    format!("{}_snapshot", live_ext)
}

/// Snapshot blob path inside a version directory.
pub fn snapshot_path(version_dir: &Path, live_ext: &str) -> PathBuf {
    version_dir.join(format!("snapshot.{}", snapshot_ext(live_ext)))
}

/// Snapshot blob path as written by builds that predate the distinct
/// extension.
pub fn legacy_snapshot_path(version_dir: &Path, live_ext: &str) -> PathBuf {
    version_dir.join(format!("snapshot.{}", live_ext))
}

/// Thumbnail file name inside a version directory.
pub const THUMBNAIL_FILE: &str = "thumbnail.png";

/// Per-object summary file for a version.
pub fn objects_filename(id: VersionId) -> String {
    format!("{}_objects.json", id)
}

/// Sibling temp file used while retrieving objects out of a snapshot. Lives
/// in the version directory so the blob's relative asset anchor is preserved.
pub fn retrieve_temp_filename(live_ext: &str) -> String {
    format!("retrieve_tmp.{}", live_ext)
}

/// Whether a file name is a retrieve temp file, current or legacy spelling.
pub fn is_retrieve_temp_name(name: &str) -> bool {
    name.starts_with("retrieve_tmp.") || name.starts_with("temp_retrieve")
}

/// Backup name used when a restore overwrites the parent file:
/// `{name}.{epoch}.bak`.
pub fn backup_name(doc_name: &str, epoch_seconds: u64) -> String {
    format!("{}.{}.bak", doc_name, epoch_seconds)
}

// ============================================================================
// Snapshot-path detection
// ============================================================================

/// If `name` is a history directory name (`.{X}_history`), return `X`.
pub fn history_dir_stem(name: &str) -> Option<&str> {
    let inner = name.strip_prefix('.')?.strip_suffix(HISTORY_SUFFIX)?;
    if inner.is_empty() { None } else { Some(inner) }
}

/// Whether the path's shape marks it as a checked-out snapshot: the
/// penultimate directory is named `.{X}_history`.
pub fn is_snapshot_path(doc_path: &Path) -> bool {
    penultimate_history_dir(doc_path).is_some()
}

/// Reconstruct the parent document path from a snapshot path.
///
/// `/prj/.Scene_history/v001/snapshot.blend_snapshot` → `/prj/Scene.blend`.
/// The live extension is recovered by stripping the `_snapshot` suffix;
/// legacy snapshots that kept the live extension pass through unchanged.
/// Returns `None` when the path does not have snapshot shape.
pub fn parent_from_snapshot(doc_path: &Path) -> Option<PathBuf> {
    let history = penultimate_history_dir(doc_path)?;
    let stem = history_dir_stem(history.file_name()?.to_str()?)?;
    let ext = doc_path.extension()?.to_str()?;
    let live_ext = ext.strip_suffix("_snapshot").unwrap_or(ext);
    Some(
        history
            .parent()?
            .join(format!("{}.{}", stem, live_ext)),
    )
}

fn penultimate_history_dir(doc_path: &Path) -> Option<&Path> {
    let history = doc_path.parent()?.parent()?;
    let name = history.file_name()?.to_str()?;
    history_dir_stem(name).map(|_| history)
}

// ============================================================================
// Identifier allocation
// ============================================================================

/// Next numbered version id: max existing + 1, starting at `v001`.
///
/// The autosave slot is ignored. Allocation refuses past [`VERSION_CEILING`];
/// rendering still widens legacy ids that already sit above it.
pub fn next_version_id<'a, I>(existing: I) -> Result<VersionId, LayoutError>
where
    I: IntoIterator<Item = &'a VersionId>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| id.number())
        .max()
        .unwrap_or(0);
    if max >= VERSION_CEILING {
        return Err(LayoutError::VersionLimit);
    }
    Ok(VersionId::Numbered(max + 1))
}

// ============================================================================
// Fork naming
// ============================================================================

/// Compute a collision-free target path for forking `source` out as a new
/// live document.
///
/// A snapshot source yields `{stem}_{vNNN}.{ext}` next to the parent file;
/// anything else yields `{stem}_fork.{ext}` next to the source. When the
/// candidate exists (per the injected probe), `_001` … `_999` suffixes are
/// tried before giving up with [`LayoutError::ForkCollision`].
pub fn fork_target<F>(source: &Path, exists: F) -> Result<PathBuf, LayoutError>
where
    F: Fn(&Path) -> bool,
{
    let (dir, base_stem, ext) = if let Some(history) = penultimate_history_dir(source) {
        let stem = history
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(history_dir_stem)
            .unwrap_or_default();
        let version = source
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.strip_suffix("_snapshot").unwrap_or(e))
            .unwrap_or_default();
        let dir = history.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        (dir, format!("{}_{}", stem, version), ext.to_string())
    } else {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let dir = source.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        (dir, format!("{}_fork", stem), ext.to_string())
    };

    let candidate = dir.join(format!("{}.{}", base_stem, ext));
    if !exists(&candidate) {
        return Ok(candidate);
    }
    for i in 1..=VERSION_CEILING {
        let candidate = dir.join(format!("{}_{:03}.{}", base_stem, i, ext));
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }
    Err(LayoutError::ForkCollision)
}

// ============================================================================
// Tests
// ============================================================================
