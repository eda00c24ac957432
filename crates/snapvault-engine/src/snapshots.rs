//! Version directory lifecycle: create, locate, delete.

use snapvault::{VersionEntry, VersionId, layout};
use snapvault_host::{DocumentHost, ThumbnailCapture, Trash};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::objects;
use crate::safety;

/// Longer-side pixel bound for stored thumbnails.
pub const THUMBNAIL_MAX_DIM: u32 = 360;

/// What a snapshot creation should produce.
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub id: VersionId,
    pub note: Option<String>,
    /// Skip the preview even when a capture capability is available.
    pub skip_thumbnail: bool,
    /// Write per-object summaries next to the blob.
    pub record_objects: bool,
}

/// Creates and removes version directories under one history root.
///
/// Creation is staged so a failure before the manifest entry is inserted
/// leaves nothing behind: the directory is rolled back when the host cannot
/// produce the snapshot copy, and the caller only inserts the returned entry
/// after every file is in place.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    live_ext: String,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>, live_ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            live_ext: live_ext.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Materialize a version directory and return the entry describing it.
    /// The manifest is not touched; insertion is the caller's move.
    pub fn create(
        &self,
        host: &mut dyn DocumentHost,
        thumbnails: Option<&dyn ThumbnailCapture>,
        req: &SnapshotRequest,
    ) -> Result<VersionEntry> {
        const ACTION: &str = "snapshot create";
        let id_str = req.id.to_string();

        fs::create_dir_all(&self.root)
            .map_err(|e| EngineError::io(ACTION, &self.root, e))?;
        let vdir = safety::safe_version_dir(ACTION, &self.root, &id_str, false)?;
        fs::create_dir_all(&vdir).map_err(|e| EngineError::io(ACTION, &vdir, e))?;

        // Thumbnail first: a failure here must never cost us the snapshot.
        let mut thumbnail_rel = None;
        if !req.skip_thumbnail
            && let Some(capture) = thumbnails
        {
            match capture.capture_png(THUMBNAIL_MAX_DIM) {
                Some(png) => {
                    let path = vdir.join(layout::THUMBNAIL_FILE);
                    match fs::write(&path, &png) {
                        Ok(()) => {
                            thumbnail_rel =
                                Some(format!("{}/{}", id_str, layout::THUMBNAIL_FILE));
                        }
                        Err(e) => warn!("thumbnail write failed, skipping: {}", e),
                    }
                }
                None => debug!("host declined thumbnail capture"),
            }
        }

        let snapshot_path = layout::snapshot_path(&vdir, &self.live_ext);
        if let Err(e) = host.save_as_copy(&snapshot_path) {
            let _ = fs::remove_dir_all(&vdir);
            return Err(e.into());
        }

        let file_size = fs::metadata(&snapshot_path).map(|m| m.len()).unwrap_or(0);

        let mut object_count = None;
        let names = host.object_names();
        if !names.is_empty() {
            object_count = Some(names.len() as u64);
        }
        if req.record_objects {
            let summaries = host.object_summaries();
            if !summaries.is_empty()
                && let Err(e) = objects::write_summaries(&vdir, req.id, &summaries)
            {
                warn!("object summary write failed for {}: {}", id_str, e);
            }
        }

        let snapshot_rel = format!(
            "{}/snapshot.{}",
            id_str,
            layout::snapshot_ext(&self.live_ext)
        );
        let mut entry = VersionEntry::new(req.id, local_timestamp())
            .with_snapshot(snapshot_rel);
        entry.note = req.note.clone();
        entry.thumbnail = thumbnail_rel;
        entry.object_count = object_count;
        entry.file_size = file_size;
        Ok(entry)
    }

    /// Find the snapshot blob for a version: the current extension first,
    /// then the legacy spelling that kept the live extension.
    pub fn locate(&self, id: VersionId) -> Option<PathBuf> {
        let vdir = layout::version_dir(&self.root, id);
        let modern = layout::snapshot_path(&vdir, &self.live_ext);
        if modern.exists() {
            return Some(modern);
        }
        let legacy = layout::legacy_snapshot_path(&vdir, &self.live_ext);
        legacy.exists().then_some(legacy)
    }

    /// Remove a version directory, trash-first when a trash is supplied.
    pub fn delete(&self, id: VersionId, trash: Option<&dyn Trash>) -> Result<()> {
        safety::delete_version_dir("version delete", &self.root, &id.to_string(), trash)
    }

    /// Remove a version directory without trash involvement.
    pub fn hard_delete(&self, id: VersionId) -> Result<()> {
        safety::hard_delete_version_dir("version delete", &self.root, &id.to_string())
    }
}

fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
