//! Applying the retention plan and sweeping stale temp files.

use snapvault::{layout, prune_plan};
use snapvault_host::Trash;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::snapshots::SnapshotStore;
use crate::store::ManifestStore;

/// Prune version directories down to `max_keep` unlocked entries.
///
/// Runs the pure plan against the current manifest under the store lock,
/// deletes each planned directory (trash-first when given a trash), and drops
/// the entries whose directories went away. A directory that refuses to die
/// keeps its entry so nothing dangles. Returns the number removed.
pub fn prune(
    store: &ManifestStore,
    snapshots: &SnapshotStore,
    parent_file: &str,
    max_keep: usize,
    trash: Option<&dyn Trash>,
) -> Result<usize> {
    store.update(parent_file, |manifest| {
        let plan = prune_plan(&manifest.sorted_versions(true, true), max_keep);
        let mut removed = 0;
        for id in plan {
            match snapshots.delete(id, trash) {
                Ok(()) => {
                    manifest.remove(id);
                    removed += 1;
                }
                Err(e) => warn!("prune could not remove {}: {}", id, e),
            }
        }
        if removed > 0 {
            debug!("pruned {} versions", removed);
        }
        Ok(removed)
    })
}

/// Delete leftover retrieve temp files (current and legacy spellings) in
/// every version directory. Returns how many files were removed.
pub fn sweep_retrieve_temps(root: &Path) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let vdir = entry.path();
        if !vdir.is_dir() {
            continue;
        }
        let Ok(files) = fs::read_dir(&vdir) else {
            continue;
        };
        for file in files.flatten() {
            let name = file.file_name();
            let Some(name) = name.to_str() else { continue };
            if layout::is_retrieve_temp_name(name) {
                match fs::remove_file(file.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!(
                        "could not sweep temp file {}: {}",
                        file.path().display(),
                        e
                    ),
                }
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault::{VersionEntry, VersionId};
    use snapvault_host::fakes::{MemoryHost, RecordingTrash};
    use tempfile::TempDir;

    use crate::snapshots::SnapshotRequest;

    struct Fixture {
        _temp: TempDir,
        host: MemoryHost,
        store: ManifestStore,
        snapshots: SnapshotStore,
        parent: String,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let doc = temp.path().join("Scene.blend");
        fs::write(&doc, b"BLEND").unwrap();
        let root = temp.path().join(".Scene_history");
        Fixture {
            host: MemoryHost::new()
                .with_path(&doc)
                .with_content(b"BLEND".to_vec()),
            store: ManifestStore::new(&root),
            snapshots: SnapshotStore::new(&root, "blend"),
            parent: doc.display().to_string(),
            _temp: temp,
        }
    }

    fn commit(f: &mut Fixture, n: u32) {
        let id = VersionId::Numbered(n);
        let entry = f
            .snapshots
            .create(
                &mut f.host,
                None,
                &SnapshotRequest {
                    id,
                    note: None,
                    skip_thumbnail: true,
                    record_objects: false,
                },
            )
            .unwrap();
        f.store
            .update(&f.parent, |m| {
                m.insert_newest(entry.clone());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_prune_removes_oldest_unlocked() {
        let mut f = fixture();
        for n in 1..=4 {
            commit(&mut f, n);
        }
        let removed = prune(&f.store, &f.snapshots, &f.parent, 2, None).unwrap();
        assert_eq!(removed, 2);

        let m = f.store.load(&f.parent, false).unwrap();
        let ids: Vec<VersionId> = m.versions.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![VersionId::Numbered(4), VersionId::Numbered(3)]);
        assert!(!f.snapshots.root().join("v001").exists());
        assert!(f.snapshots.root().join("v003").exists());
    }

    #[test]
    fn test_prune_respects_locks_and_autosave() {
        let mut f = fixture();
        for n in 1..=4 {
            commit(&mut f, n);
        }
        // lock v001, add an autosave slot
        f.store
            .update(&f.parent, |m| {
                m.find_mut(VersionId::Numbered(1)).unwrap().is_protected = true;
                m.insert_newest(VersionEntry::new(VersionId::Autosave, "t"));
                Ok(())
            })
            .unwrap();
        fs::create_dir_all(f.snapshots.root().join("autosave")).unwrap();

        let trash = RecordingTrash::new();
        let removed = prune(&f.store, &f.snapshots, &f.parent, 1, Some(&trash)).unwrap();
        assert_eq!(removed, 2); // v003 and v002

        let m = f.store.load(&f.parent, false).unwrap();
        let ids: Vec<VersionId> = m
            .sorted_versions(true, true)
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                VersionId::Numbered(4),
                VersionId::Numbered(1),
                VersionId::Autosave,
            ]
        );
        assert!(f.snapshots.root().join("autosave").exists());
        assert_eq!(trash.sent_paths().len(), 2);
    }

    #[test]
    fn test_prune_is_idempotent() {
        let mut f = fixture();
        for n in 1..=3 {
            commit(&mut f, n);
        }
        assert_eq!(prune(&f.store, &f.snapshots, &f.parent, 2, None).unwrap(), 1);
        assert_eq!(prune(&f.store, &f.snapshots, &f.parent, 2, None).unwrap(), 0);
    }

    #[test]
    fn test_sweep_retrieve_temps() {
        let f = fixture();
        let vdir = f.snapshots.root().join("v001");
        fs::create_dir_all(&vdir).unwrap();
        fs::write(vdir.join("retrieve_tmp.blend"), b"x").unwrap();
        fs::write(vdir.join("temp_retrieve_old.blend"), b"x").unwrap();
        fs::write(vdir.join("snapshot.blend_snapshot"), b"keep").unwrap();

        let removed = sweep_retrieve_temps(f.snapshots.root());
        assert_eq!(removed, 2);
        assert!(vdir.join("snapshot.blend_snapshot").exists());
        assert!(!vdir.join("retrieve_tmp.blend").exists());
    }

    #[test]
    fn test_sweep_missing_root() {
        assert_eq!(sweep_retrieve_temps(Path::new("/nonexistent/root")), 0);
    }
}
