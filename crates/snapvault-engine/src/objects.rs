//! Per-object summary files and history reports.
//!
//! Summaries are compact JSON keyed by object name, rounded to four decimal
//! places by the core types; comparisons across versions happen in
//! `snapvault::objects`.

use snapvault::{Manifest, ObjectChange, ObjectState, VersionId, classify_history, layout};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Write `<id>_objects.json` into a version directory.
pub fn write_summaries(
    version_dir: &Path,
    id: VersionId,
    summaries: &[(String, ObjectState)],
) -> io::Result<()> {
    let map: BTreeMap<&str, ObjectState> = summaries
        .iter()
        .map(|(name, state)| (name.as_str(), state.rounded()))
        .collect();
    let path = version_dir.join(layout::objects_filename(id));
    let json = serde_json::to_string(&map)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

/// Read a version's summary file, if it exists and parses. Parse failures
/// are logged and treated as absent data.
pub fn read_summaries(root: &Path, id: VersionId) -> Option<BTreeMap<String, ObjectState>> {
    let path = layout::version_dir(root, id).join(layout::objects_filename(id));
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(map) => Some(map),
        Err(e) => {
            warn!("ignoring malformed object records {}: {}", path.display(), e);
            None
        }
    }
}

/// Every object name seen in any version's summary file.
pub fn known_object_names(root: &Path, manifest: &Manifest) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for entry in manifest.sorted_versions(false, true) {
        if let Some(map) = read_summaries(root, entry.id) {
            names.extend(map.into_keys());
        }
    }
    names
}

/// Classified timeline of one object across all versions with recorded
/// summaries, newest first. Versions without a summary file carry no
/// information and are skipped.
pub fn object_history(
    root: &Path,
    manifest: &Manifest,
    name: &str,
    include_records: bool,
) -> Vec<ObjectChange> {
    let mut snapshots: Vec<(VersionId, Option<ObjectState>)> = Vec::new();
    for entry in manifest.sorted_versions(false, true) {
        if let Some(mut map) = read_summaries(root, entry.id) {
            snapshots.push((entry.id, map.remove(name)));
        }
    }
    let series: Vec<(VersionId, Option<&ObjectState>)> = snapshots
        .iter()
        .map(|(id, state)| (*id, state.as_ref()))
        .collect();
    classify_history(&series, include_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault::{ChangeKind, VersionEntry};
    use tempfile::TempDir;

    const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    fn state(v_count: u64) -> ObjectState {
        ObjectState::new(IDENTITY, [[0.0; 3], [1.0; 3]], v_count)
    }

    fn write_version(root: &Path, id: VersionId, objs: &[(String, ObjectState)]) {
        let vdir = layout::version_dir(root, id);
        fs::create_dir_all(&vdir).unwrap();
        write_summaries(&vdir, id, objs).unwrap();
    }

    fn manifest_with_versions(ids: &[VersionId]) -> Manifest {
        let mut m = Manifest::new("/p/a.blend", "u".to_string());
        for id in ids {
            m.insert_newest(VersionEntry::new(*id, "t"));
        }
        m
    }

    #[test]
    fn test_write_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        write_version(
            temp.path(),
            VersionId::Numbered(1),
            &[("Cube".to_string(), state(8))],
        );
        let map = read_summaries(temp.path(), VersionId::Numbered(1)).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["Cube"].v_count, 8);
    }

    #[test]
    fn test_read_missing_and_malformed() {
        let temp = TempDir::new().unwrap();
        assert!(read_summaries(temp.path(), VersionId::Numbered(1)).is_none());

        let vdir = temp.path().join("v002");
        fs::create_dir_all(&vdir).unwrap();
        fs::write(vdir.join("v002_objects.json"), "garbage").unwrap();
        assert!(read_summaries(temp.path(), VersionId::Numbered(2)).is_none());
    }

    #[test]
    fn test_object_history_across_versions() {
        let temp = TempDir::new().unwrap();
        write_version(
            temp.path(),
            VersionId::Numbered(1),
            &[("Cube".to_string(), state(8))],
        );
        write_version(
            temp.path(),
            VersionId::Numbered(2),
            &[("Cube".to_string(), state(20))],
        );
        let m = manifest_with_versions(&[VersionId::Numbered(1), VersionId::Numbered(2)]);

        let history = object_history(temp.path(), &m, "Cube", false);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version, VersionId::Numbered(2));
        assert_eq!(history[0].kind, ChangeKind::Major);
        assert_eq!(history[0].detail, "Vertices +12");
        assert_eq!(history[1].kind, ChangeKind::Created);
    }

    #[test]
    fn test_versions_without_records_are_skipped() {
        let temp = TempDir::new().unwrap();
        write_version(
            temp.path(),
            VersionId::Numbered(1),
            &[("Cube".to_string(), state(8))],
        );
        // v002 has no objects file at all
        let m = manifest_with_versions(&[VersionId::Numbered(1), VersionId::Numbered(2)]);
        let history = object_history(temp.path(), &m, "Cube", true);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_known_object_names() {
        let temp = TempDir::new().unwrap();
        write_version(
            temp.path(),
            VersionId::Numbered(1),
            &[("Cube".to_string(), state(8)), ("Lamp".to_string(), state(1))],
        );
        write_version(
            temp.path(),
            VersionId::Numbered(2),
            &[("Camera".to_string(), state(0))],
        );
        let m = manifest_with_versions(&[VersionId::Numbered(1), VersionId::Numbered(2)]);
        let names = known_object_names(temp.path(), &m);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["Camera", "Cube", "Lamp"]
        );
    }
}
