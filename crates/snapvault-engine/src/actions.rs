//! The guarded actions: every top-level operation that mutates a history
//! directory or the document goes through [`Vault`].
//!
//! Each action re-derives the project's paths from the host's current
//! document path, takes the store lock for its manifest mutation, and keeps
//! the all-or-nothing contract: either the action completes and the manifest
//! is written once, or disk and manifest stay as they were.

use snapvault::{ObjectChange, VersionEntry, VersionId, VersionTag, layout};
use snapvault_host::{DocumentHost, ThumbnailCapture, Trash};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::error::{EngineError, Result};
use crate::objects;
use crate::remap;
use crate::retention;
use crate::safety::{self, OsTrash};
use crate::snapshots::{SnapshotRequest, SnapshotStore};
use crate::store::ManifestStore;

/// Attempts to remove a retrieve temp file before it is declared stale.
const TEMP_REMOVE_ATTEMPTS: u32 = 5;

/// Read-only summary of the current document's standing.
#[derive(Debug, Clone)]
pub struct VaultStatus {
    pub document: PathBuf,
    pub snapshot_mode: bool,
    /// Parent document when in snapshot mode.
    pub parent: Option<PathBuf>,
    pub history_root: PathBuf,
    pub project_uuid: Option<String>,
    pub version_count: usize,
    pub has_autosave: bool,
}

/// State handed back by [`Vault::rescue_begin`] while the host drives its
/// native append UI; poll it to detect completion and clean up.
#[derive(Debug)]
pub struct RescueSession {
    pub version: VersionId,
    pub temp_path: PathBuf,
    baseline_objects: usize,
    baseline_assets: HashSet<String>,
}

/// The engine facade: a host plus the capabilities and configuration every
/// guarded action needs.
///
/// # Example
///
/// ```rust,no_run
/// use snapvault_engine::Vault;
/// use snapvault_host::fakes::MemoryHost;
///
/// let host = MemoryHost::new().with_path("/prj/Scene.blend");
/// let mut vault = Vault::new(host);
/// vault.commit(Some("Initial".to_string()))?;
/// # Ok::<(), snapvault_engine::EngineError>(())
/// ```
pub struct Vault<H: DocumentHost> {
    host: H,
    thumbnails: Option<Box<dyn ThumbnailCapture>>,
    trash: Box<dyn Trash>,
    config: VaultConfig,
}

impl<H: DocumentHost> Vault<H> {
    /// Wrap a host with default configuration, no thumbnail capture, and the
    /// platform trash.
    pub fn new(host: H) -> Self {
        Self {
            host,
            thumbnails: None,
            trash: Box::new(OsTrash),
            config: VaultConfig::default(),
        }
    }

    pub fn with_thumbnails(mut self, thumbnails: Box<dyn ThumbnailCapture>) -> Self {
        self.thumbnails = Some(thumbnails);
        self
    }

    pub fn with_trash(mut self, trash: Box<dyn Trash>) -> Self {
        self.trash = trash;
        self
    }

    pub fn with_config(mut self, config: VaultConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VaultConfig {
        &mut self.config
    }

    // ── Read-only queries ────────────────────────────────────────────

    /// Where the current document stands: live or snapshot, and what its
    /// history looks like.
    pub fn status(&self) -> Result<VaultStatus> {
        let paths = self.project_paths("status")?;
        let store = ManifestStore::new(&paths.root);
        let manifest = if store.exists() {
            Some(store.load(&paths.parent_str(), false)?)
        } else {
            None
        };
        Ok(VaultStatus {
            document: paths.doc.clone(),
            snapshot_mode: paths.snapshot_mode,
            parent: paths.snapshot_mode.then(|| paths.live_doc.clone()),
            history_root: paths.root,
            project_uuid: manifest.as_ref().map(|m| m.project_uuid.clone()),
            version_count: manifest
                .as_ref()
                .map(|m| m.sorted_versions(true, false).len())
                .unwrap_or(0),
            has_autosave: manifest
                .as_ref()
                .is_some_and(|m| m.find(VersionId::Autosave).is_some()),
        })
    }

    /// All manifest entries, newest first.
    pub fn versions(&self) -> Result<Vec<VersionEntry>> {
        let paths = self.project_paths("list")?;
        let store = ManifestStore::new(&paths.root);
        if !store.exists() {
            return Ok(Vec::new());
        }
        let manifest = store.load(&paths.parent_str(), false)?;
        Ok(manifest
            .sorted_versions(true, true)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Classified change timeline of one object, newest first.
    pub fn object_history(&self, name: &str, include_records: bool) -> Result<Vec<ObjectChange>> {
        let paths = self.project_paths("objects")?;
        let store = ManifestStore::new(&paths.root);
        let manifest = store.load(&paths.parent_str(), false)?;
        Ok(objects::object_history(
            &paths.root,
            &manifest,
            name,
            include_records,
        ))
    }

    /// Every object name with recorded history.
    pub fn known_objects(&self) -> Result<Vec<String>> {
        let paths = self.project_paths("objects")?;
        let store = ManifestStore::new(&paths.root);
        let manifest = store.load(&paths.parent_str(), false)?;
        Ok(objects::known_object_names(&paths.root, &manifest)
            .into_iter()
            .collect())
    }

    // ── Commit ───────────────────────────────────────────────────────

    /// Capture a new numbered version of the live document.
    ///
    /// Refused in snapshot mode and for never-saved documents. The note
    /// falls back to the host's editing context. Prunes afterwards when
    /// configured.
    pub fn commit(&mut self, note: Option<String>) -> Result<VersionEntry> {
        const ACTION: &str = "commit";
        let paths = self.project_paths(ACTION)?;
        if paths.snapshot_mode {
            return Err(EngineError::SnapshotGuard { action: ACTION });
        }

        let incoming = fs::metadata(&paths.doc).map(|m| m.len()).unwrap_or(0);
        let probe = paths.doc.parent().unwrap_or(Path::new("."));
        safety::ensure_free_space(ACTION, probe, incoming, self.config.min_free_bytes)?;

        let store = ManifestStore::new(&paths.root);
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let note = note.or_else(|| self.host.editing_context());
        let record_objects = self.config.record_objects;

        let host = &mut self.host;
        let thumbs = self.thumbnails.as_deref();
        let entry = store.update(&paths.parent_str(), |manifest| {
            let id = manifest.next_id()?;
            let entry = snapshots.create(
                host,
                thumbs,
                &SnapshotRequest {
                    id,
                    note: note.clone(),
                    skip_thumbnail: false,
                    record_objects,
                },
            )?;
            manifest.insert_newest(entry.clone());
            Ok(entry)
        })?;
        info!("committed {} for {}", entry.id, paths.doc.display());

        if self.config.prune_on_commit {
            self.prune()?;
        }
        Ok(entry)
    }

    /// Overwrite the autosave slot with a fresh snapshot. Thumbnails are
    /// skipped and the previous autosave directory is reclaimed immediately,
    /// without the trash round-trip.
    pub fn autosave_commit(&mut self) -> Result<VersionEntry> {
        const ACTION: &str = "autosave";
        let paths = self.project_paths(ACTION)?;
        if paths.snapshot_mode {
            return Err(EngineError::SnapshotGuard { action: ACTION });
        }

        let store = ManifestStore::new(&paths.root);
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let record_objects = self.config.record_objects;
        let host = &mut self.host;

        store.update(&paths.parent_str(), |manifest| {
            manifest.remove(VersionId::Autosave);
            snapshots.hard_delete(VersionId::Autosave)?;
            let entry = snapshots.create(
                host,
                None,
                &SnapshotRequest {
                    id: VersionId::Autosave,
                    note: Some("Auto Save".to_string()),
                    skip_thumbnail: true,
                    record_objects,
                },
            )?;
            manifest.insert_newest(entry.clone());
            Ok(entry)
        })
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Open a version's snapshot in the host.
    ///
    /// A dangling entry (blob missing on disk) is healed — removed from the
    /// manifest — and reported as not found. A dirty document refuses unless
    /// the caller authorized an in-place save first.
    pub fn checkout(&mut self, id: VersionId, save_current: bool) -> Result<PathBuf> {
        const ACTION: &str = "checkout";
        let paths = self.project_paths(ACTION)?;
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());

        let Some(snapshot_path) = snapshots.locate(id) else {
            self.heal_missing(ACTION, &paths, id)?;
            return Err(EngineError::NotFound {
                action: ACTION,
                path: layout::version_dir(&paths.root, id),
            });
        };

        if self.host.is_dirty() {
            if !save_current {
                return Err(EngineError::Dirty);
            }
            self.host.save_in_place()?;
        }

        self.host.open(&snapshot_path)?;
        // load-time hook: a snapshot sits two directories deeper than the
        // document its relative paths were authored against
        remap::remap_to_snapshot_depth(&mut self.host)?;
        Ok(snapshot_path)
    }

    /// Overwrite the parent document with the currently open snapshot,
    /// backing the parent up into the history directory first.
    pub fn restore(&mut self) -> Result<PathBuf> {
        const ACTION: &str = "restore";
        let paths = self.project_paths(ACTION)?;
        if !paths.snapshot_mode {
            return Err(EngineError::conflict(ACTION, "the open document is not a snapshot"));
        }
        let parent = paths.live_doc.clone();

        if parent.exists() {
            let name = parent
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let backup = paths.root.join(layout::backup_name(name, epoch_now()));
            fs::create_dir_all(&paths.root)
                .map_err(|e| EngineError::io(ACTION, &paths.root, e))?;
            fs::copy(&parent, &backup).map_err(|e| EngineError::io(ACTION, &backup, e))?;
            info!("backed up {} to {}", parent.display(), backup.display());
        }

        self.host.save_as(&parent)?;
        if remap::unmap_from_snapshot_depth(&mut self.host)? {
            self.host.save_in_place()?;
        }
        Ok(parent)
    }

    /// Leave snapshot mode by opening the parent document.
    pub fn open_parent(&mut self) -> Result<PathBuf> {
        const ACTION: &str = "open parent";
        let paths = self.project_paths(ACTION)?;
        if !paths.snapshot_mode {
            return Err(EngineError::conflict(ACTION, "the open document is not a snapshot"));
        }
        let parent = paths.live_doc.clone();
        if !parent.exists() {
            return Err(EngineError::NotFound {
                action: ACTION,
                path: parent,
            });
        }
        self.host.open(&parent)?;
        Ok(parent)
    }

    /// Copy the currently open snapshot out as a new live document with its
    /// own, empty history.
    pub fn fork(&mut self, unbind_assets: bool) -> Result<PathBuf> {
        const ACTION: &str = "fork";
        let paths = self.project_paths(ACTION)?;
        if !paths.snapshot_mode {
            return Err(EngineError::conflict(ACTION, "the open document is not a snapshot"));
        }

        let target = layout::fork_target(&paths.doc, |p| p.exists())?;
        let new_root = layout::history_root(&target);
        let store = ManifestStore::new(&new_root);
        store.load(&target.display().to_string(), true)?;

        self.host.save_as(&target)?;
        if unbind_assets {
            self.host.localize_linked_data()?;
            self.host.clear_asset_marks()?;
            self.host.save_in_place()?;
        }
        if remap::unmap_from_snapshot_depth(&mut self.host)? {
            self.host.save_in_place()?;
        }
        info!("forked {} to {}", paths.doc.display(), target.display());
        Ok(target)
    }

    /// Intercept the host's in-place save: refused in snapshot mode,
    /// delegated otherwise.
    pub fn guard_save(&mut self) -> Result<()> {
        const ACTION: &str = "save";
        let doc = self.doc_path(ACTION)?;
        if layout::is_snapshot_path(&doc) {
            return Err(EngineError::SnapshotGuard { action: ACTION });
        }
        self.host.save_in_place()?;
        Ok(())
    }

    // ── History maintenance ──────────────────────────────────────────

    /// Adopt an externally supplied history directory for the current
    /// document. `source` may be the directory or its `manifest.json`.
    pub fn link_history(&mut self, source: &Path) -> Result<PathBuf> {
        const ACTION: &str = "link history";
        let paths = self.project_paths(ACTION)?;
        if paths.root.exists() {
            return Err(EngineError::conflict(
                ACTION,
                "a history directory already exists for this document",
            ));
        }

        let source_dir = if source.is_file() { source.parent().unwrap_or(source) } else { source };
        let manifest_file = source_dir.join(layout::MANIFEST_FILE);
        if !manifest_file.exists() {
            return Err(EngineError::NotFound {
                action: ACTION,
                path: manifest_file,
            });
        }
        let text = fs::read_to_string(&manifest_file)
            .map_err(|e| EngineError::io(ACTION, &manifest_file, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| EngineError::ManifestInvalid {
                path: manifest_file.clone(),
                reason: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(EngineError::ManifestInvalid {
                path: manifest_file,
                reason: "manifest root is not an object".to_string(),
            });
        }

        fs::rename(source_dir, &paths.root)
            .map_err(|e| EngineError::io(ACTION, source_dir, e))?;

        let store = ManifestStore::new(&paths.root);
        let parent_str = paths.parent_str();
        store.update(&parent_str, |manifest| {
            manifest.parent_file = parent_str.clone();
            Ok(())
        })?;
        info!("linked history {} -> {}", source_dir.display(), paths.root.display());
        Ok(paths.root)
    }

    /// Apply the retention policy now. Returns how many versions went away.
    pub fn prune(&mut self) -> Result<usize> {
        let paths = self.project_paths("prune")?;
        let store = ManifestStore::new(&paths.root);
        if !store.exists() {
            return Ok(0);
        }
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let trash = self.config.use_trash.then_some(self.trash.as_ref());
        retention::prune(
            &store,
            &snapshots,
            &paths.parent_str(),
            self.config.max_keep,
            trash,
        )
    }

    /// Retention pass plus a sweep of stale retrieve temp files.
    pub fn refresh(&mut self) -> Result<usize> {
        let removed = self.prune()?;
        let paths = self.project_paths("refresh")?;
        let swept = retention::sweep_retrieve_temps(&paths.root);
        if swept > 0 {
            debug!("swept {} stale temp files", swept);
        }
        Ok(removed)
    }

    /// Delete one version: trash the directory, then drop the entry. Locked
    /// entries are refused.
    pub fn delete_version(&mut self, id: VersionId) -> Result<()> {
        const ACTION: &str = "delete";
        let paths = self.project_paths(ACTION)?;
        let store = ManifestStore::new(&paths.root);
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let trash = self.config.use_trash.then_some(self.trash.as_ref());

        store.update(&paths.parent_str(), |manifest| {
            let entry = manifest.find(id).ok_or_else(|| EngineError::NotFound {
                action: ACTION,
                path: layout::version_dir(&paths.root, id),
            })?;
            if entry.is_protected {
                return Err(EngineError::conflict(ACTION, format!("{} is locked", id)));
            }
            snapshots.delete(id, trash)?;
            manifest.remove(id);
            Ok(())
        })
    }

    /// String-id variant of [`Vault::delete_version`], for callers handing
    /// through untrusted identifiers. Traversal attempts fail closed before
    /// anything is resolved.
    pub fn delete_version_by_id(&mut self, id: &str) -> Result<()> {
        const ACTION: &str = "delete";
        if !safety::is_safe_filename(id) {
            return Err(EngineError::Security {
                action: ACTION,
                path: PathBuf::from(id),
            });
        }
        let id: VersionId = id.parse().map_err(|_| EngineError::NotFound {
            action: ACTION,
            path: PathBuf::from(id),
        })?;
        self.delete_version(id)
    }

    /// Lock or unlock a version. The autosave slot is never protectable.
    pub fn set_protection(&mut self, id: VersionId, protected: bool) -> Result<()> {
        const ACTION: &str = "lock";
        if id.is_autosave() {
            return Err(EngineError::conflict(ACTION, "the autosave slot cannot be locked"));
        }
        self.edit_entry(ACTION, id, |entry| entry.is_protected = protected)
    }

    /// Tag a version.
    pub fn set_tag(&mut self, id: VersionId, tag: VersionTag) -> Result<()> {
        self.edit_entry("tag", id, |entry| entry.tag = tag)
    }

    /// Replace a version's note.
    pub fn set_note(&mut self, id: VersionId, note: impl Into<String>) -> Result<()> {
        let note = note.into();
        self.edit_entry("note", id, move |entry| entry.note = Some(note))
    }

    // ── Partial reimport ─────────────────────────────────────────────

    /// Objects available inside a version's snapshot, as the host reads them.
    pub fn list_snapshot_objects(&mut self, id: VersionId) -> Result<Vec<String>> {
        const ACTION: &str = "retrieve";
        let paths = self.project_paths(ACTION)?;
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let Some(blob) = snapshots.locate(id) else {
            self.heal_missing(ACTION, &paths, id)?;
            return Err(EngineError::NotFound {
                action: ACTION,
                path: layout::version_dir(&paths.root, id),
            });
        };
        Ok(self.host.list_objects(&blob)?)
    }

    /// Pull selected objects (plus their dependencies) out of a snapshot
    /// into the live document.
    ///
    /// The blob is duplicated to a sibling temp file so the host reads it
    /// with the snapshot's own relative anchor; freshly introduced external
    /// references are rewritten back to live depth, and the temp file is
    /// removed eagerly with a bounded retry for transient locks.
    pub fn retrieve_objects(&mut self, id: VersionId, names: &[String]) -> Result<usize> {
        const ACTION: &str = "retrieve";
        if names.is_empty() {
            return Err(EngineError::Cancelled { action: ACTION });
        }
        let paths = self.project_paths(ACTION)?;
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let Some(blob) = snapshots.locate(id) else {
            self.heal_missing(ACTION, &paths, id)?;
            return Err(EngineError::NotFound {
                action: ACTION,
                path: layout::version_dir(&paths.root, id),
            });
        };

        let temp = blob.with_file_name(layout::retrieve_temp_filename(&paths.live_ext()));
        fs::copy(&blob, &temp).map_err(|e| EngineError::io(ACTION, &temp, e))?;

        let result = self.append_from_temp(&temp, names);
        if !safety::remove_file_with_retries(&temp, TEMP_REMOVE_ATTEMPTS) {
            warn!("temp file left behind (swept on next refresh): {}", temp.display());
        }
        result
    }

    fn append_from_temp(&mut self, temp: &Path, names: &[String]) -> Result<usize> {
        const ACTION: &str = "retrieve";
        let available = self.host.list_objects(temp)?;
        for name in names {
            if !available.contains(name) {
                return Err(EngineError::conflict(
                    ACTION,
                    format!("object not present in snapshot: {}", name),
                ));
            }
        }
        let before: HashSet<String> = self
            .host
            .referenced_assets()
            .into_iter()
            .map(|a| a.handle)
            .collect();
        let appended = self.host.append_objects(temp, names)?;
        let introduced: HashSet<String> = self
            .host
            .referenced_assets()
            .into_iter()
            .map(|a| a.handle)
            .filter(|h| !before.contains(h))
            .collect();
        remap::fix_retrieved_assets(&mut self.host, &introduced)?;
        Ok(appended)
    }

    // ── Rescue (legacy append flow) ──────────────────────────────────

    /// Stage a snapshot for the host's native append UI. The caller shows
    /// the UI against [`RescueSession::temp_path`] and then polls
    /// [`Vault::rescue_poll`] from its timer.
    pub fn rescue_begin(&mut self, id: VersionId) -> Result<RescueSession> {
        const ACTION: &str = "rescue";
        let paths = self.project_paths(ACTION)?;
        let snapshots = SnapshotStore::new(&paths.root, paths.live_ext());
        let Some(blob) = snapshots.locate(id) else {
            self.heal_missing(ACTION, &paths, id)?;
            return Err(EngineError::NotFound {
                action: ACTION,
                path: layout::version_dir(&paths.root, id),
            });
        };
        let temp = blob.with_file_name(layout::retrieve_temp_filename(&paths.live_ext()));
        fs::copy(&blob, &temp).map_err(|e| EngineError::io(ACTION, &temp, e))?;
        Ok(RescueSession {
            version: id,
            temp_path: temp,
            baseline_objects: self.host.object_names().len(),
            baseline_assets: self
                .host
                .referenced_assets()
                .into_iter()
                .map(|a| a.handle)
                .collect(),
        })
    }

    /// Check whether the host's append happened. On success the new external
    /// references are fixed up, the temp file is removed, and the number of
    /// new objects is returned. `None` means nothing observable yet.
    pub fn rescue_poll(&mut self, session: &RescueSession) -> Result<Option<usize>> {
        let objects_now = self.host.object_names().len();
        let assets_now: HashSet<String> = self
            .host
            .referenced_assets()
            .into_iter()
            .map(|a| a.handle)
            .collect();
        let new_assets: HashSet<String> = assets_now
            .difference(&session.baseline_assets)
            .cloned()
            .collect();

        if objects_now == session.baseline_objects && new_assets.is_empty() {
            return Ok(None);
        }

        remap::fix_retrieved_assets(&mut self.host, &new_assets)?;
        if !safety::remove_file_with_retries(&session.temp_path, TEMP_REMOVE_ATTEMPTS) {
            warn!(
                "rescue temp left behind (swept on next refresh): {}",
                session.temp_path.display()
            );
        }
        Ok(Some(objects_now.saturating_sub(session.baseline_objects)))
    }

    /// Abandon a rescue: remove the staged temp file.
    pub fn rescue_abort(&mut self, session: RescueSession) {
        if !safety::remove_file_with_retries(&session.temp_path, TEMP_REMOVE_ATTEMPTS) {
            warn!(
                "rescue temp left behind (swept on next refresh): {}",
                session.temp_path.display()
            );
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn doc_path(&self, action: &'static str) -> Result<PathBuf> {
        self.host
            .current_path()
            .ok_or_else(|| EngineError::conflict(action, "the document has never been saved"))
    }

    fn project_paths(&self, action: &'static str) -> Result<ProjectPaths> {
        let doc = self.doc_path(action)?;
        let (live_doc, snapshot_mode) = match layout::parent_from_snapshot(&doc) {
            Some(parent) => (parent, true),
            None => (doc.clone(), false),
        };
        let root = layout::history_root(&live_doc);
        Ok(ProjectPaths {
            doc,
            live_doc,
            root,
            snapshot_mode,
        })
    }

    /// Drop a manifest entry whose snapshot blob is gone from disk.
    fn heal_missing(&self, action: &'static str, paths: &ProjectPaths, id: VersionId) -> Result<()> {
        let store = ManifestStore::new(&paths.root);
        if !store.exists() {
            return Ok(());
        }
        store.update(&paths.parent_str(), |manifest| {
            if manifest.remove(id).is_some() {
                warn!("{}: healed dangling entry {}", action, id);
            }
            Ok(())
        })
    }

    fn edit_entry(
        &mut self,
        action: &'static str,
        id: VersionId,
        edit: impl FnOnce(&mut VersionEntry),
    ) -> Result<()> {
        let paths = self.project_paths(action)?;
        let store = ManifestStore::new(&paths.root);
        store.update(&paths.parent_str(), |manifest| {
            let entry = manifest.find_mut(id).ok_or_else(|| EngineError::NotFound {
                action,
                path: layout::version_dir(&paths.root, id),
            })?;
            edit(entry);
            Ok(())
        })
    }
}

/// Everything the engine needs to know about where a document's project
/// lives, derived fresh from the host's current path each action.
#[derive(Debug, Clone)]
struct ProjectPaths {
    /// The open document as the host reports it.
    doc: PathBuf,
    /// The live document: `doc` itself, or the resolved parent in snapshot
    /// mode.
    live_doc: PathBuf,
    root: PathBuf,
    snapshot_mode: bool,
}

impl ProjectPaths {
    fn parent_str(&self) -> String {
        self.live_doc.display().to_string()
    }

    fn live_ext(&self) -> String {
        self.live_doc
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("dat")
            .to_string()
    }
}

fn epoch_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Free disk space under `path`, exposed so hosts can warn before a commit.
pub fn get_free_disk_space(path: &Path) -> std::io::Result<u64> {
    safety::free_disk_space(path)
}
