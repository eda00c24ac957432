//! Filename validation, confined path resolution, and deletion routes.
//!
//! Every filesystem mutation that consumes a user- or manifest-supplied
//! identifier resolves its target here first. A resolved path whose canonical
//! prefix is not the history directory fails with a security error before any
//! side effect.

use snapvault_host::Trash;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{EngineError, Result};

/// Whether a string is usable as a single path component under the history
/// directory. Rejects empty strings and anything smelling of traversal.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Resolve `HistoryRoot/<id>` with confinement checks.
///
/// `id` must pass [`is_safe_filename`]; the canonicalized target must stay
/// under the canonicalized root. With `must_exist` the target is additionally
/// required to be present (yielding `NotFound` otherwise, so callers can
/// treat an already-missing directory as done).
pub fn safe_version_dir(
    action: &'static str,
    root: &Path,
    id: &str,
    must_exist: bool,
) -> Result<PathBuf> {
    if !is_safe_filename(id) {
        return Err(EngineError::Security {
            action,
            path: root.join(id),
        });
    }
    let canonical_root = root.canonicalize().map_err(|_| EngineError::NotFound {
        action,
        path: root.to_path_buf(),
    })?;
    let target = canonical_root.join(id);

    if must_exist {
        let canonical_target = target.canonicalize().map_err(|_| EngineError::NotFound {
            action,
            path: target.clone(),
        })?;
        if !canonical_target.starts_with(&canonical_root) {
            return Err(EngineError::Security {
                action,
                path: canonical_target,
            });
        }
        return Ok(canonical_target);
    }

    if !target.starts_with(&canonical_root) {
        return Err(EngineError::Security {
            action,
            path: target,
        });
    }
    Ok(target)
}

/// Remove a version directory via the platform trash, falling back to a
/// recursive remove when the trash declines. A directory that is already
/// gone counts as removed.
pub fn delete_version_dir(
    action: &'static str,
    root: &Path,
    id: &str,
    trash: Option<&dyn Trash>,
) -> Result<()> {
    let target = match safe_version_dir(action, root, id, true) {
        Ok(t) => t,
        Err(EngineError::NotFound { .. }) => return Ok(()),
        Err(e) => return Err(e),
    };
    if let Some(trash) = trash {
        match trash.send_to_trash(&target) {
            Ok(()) => return Ok(()),
            Err(e) => warn!(
                "trash declined {}, removing directly: {}",
                target.display(),
                e
            ),
        }
    }
    fs::remove_dir_all(&target).map_err(|e| EngineError::io(action, &target, e))
}

/// The hard route: remove a version directory without trash involvement.
/// Used where the content is disposable by construction (autosave overwrite,
/// temp cleanup).
pub fn hard_delete_version_dir(action: &'static str, root: &Path, id: &str) -> Result<()> {
    delete_version_dir(action, root, id, None)
}

/// Remove a file, retrying a few times for transient locks (virus scanners,
/// indexers holding the handle). Returns whether the file is gone.
pub fn remove_file_with_retries(path: &Path, attempts: u32) -> bool {
    for _ in 0..attempts.max(1) {
        match fs::remove_file(path) {
            Ok(()) => return true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return true,
            Err(_) => {}
        }
    }
    !path.exists()
}

/// Free bytes on the filesystem holding `path`.
pub fn free_disk_space(path: &Path) -> std::io::Result<u64> {
    fs2::available_space(path)
}

/// Refuse an action that would drop free space below the configured floor.
/// Probes that themselves fail are logged and waved through — an exotic
/// filesystem should not block a commit.
pub fn ensure_free_space(
    action: &'static str,
    path: &Path,
    incoming: u64,
    min_free: u64,
) -> Result<()> {
    match free_disk_space(path) {
        Ok(available) => {
            if available < incoming.saturating_add(min_free) {
                return Err(EngineError::DiskFull {
                    path: path.to_path_buf(),
                    available,
                });
            }
            Ok(())
        }
        Err(e) => {
            warn!("{}: free-space probe failed for {}: {}", action, path.display(), e);
            Ok(())
        }
    }
}

/// [`Trash`] backed by the platform facility.
pub struct OsTrash;

impl Trash for OsTrash {
    fn send_to_trash(&self, path: &Path) -> snapvault_host::Result<()> {
        trash::delete(path).map_err(|e| snapvault_host::HostError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault_host::fakes::RecordingTrash;
    use tempfile::TempDir;

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("v001"));
        assert!(is_safe_filename("autosave"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc"));
        assert!(!is_safe_filename("a/b"));
        assert!(!is_safe_filename("a\\b"));
        assert!(!is_safe_filename("v..1"));
    }

    #[test]
    fn test_safe_version_dir_resolves_child() {
        let temp = TempDir::new().unwrap();
        let vdir = temp.path().join("v001");
        fs::create_dir(&vdir).unwrap();

        let resolved = safe_version_dir("test", temp.path(), "v001", true).unwrap();
        assert!(resolved.starts_with(temp.path().canonicalize().unwrap()));
        assert!(resolved.ends_with("v001"));
    }

    #[test]
    fn test_safe_version_dir_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        for bad in ["../etc", "..", "a/b", "a\\b", ""] {
            let err = safe_version_dir("test", temp.path(), bad, false).unwrap_err();
            assert!(matches!(err, EngineError::Security { .. }), "{:?}", bad);
        }
    }

    #[test]
    fn test_safe_version_dir_missing_root() {
        let temp = TempDir::new().unwrap();
        let err =
            safe_version_dir("test", &temp.path().join("nope"), "v001", false).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_safe_version_dir_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = safe_version_dir("test", temp.path(), "v001", true).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_version_dir_rejects_symlink_escape() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        let outside = temp.path().join("outside");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("v001")).unwrap();

        let err = safe_version_dir("test", &root, "v001", true).unwrap_err();
        assert!(matches!(err, EngineError::Security { .. }));
    }

    #[test]
    fn test_delete_version_dir_trash_then_fallback() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("v001")).unwrap();

        let trash = RecordingTrash::new();
        delete_version_dir("test", temp.path(), "v001", Some(&trash)).unwrap();
        assert!(!temp.path().join("v001").exists());
        assert_eq!(trash.sent_paths().len(), 1);

        // failing trash falls back to direct removal
        fs::create_dir(temp.path().join("v002")).unwrap();
        let failing = RecordingTrash::failing();
        delete_version_dir("test", temp.path(), "v002", Some(&failing)).unwrap();
        assert!(!temp.path().join("v002").exists());
    }

    #[test]
    fn test_delete_version_dir_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        delete_version_dir("test", temp.path(), "v404", None).unwrap();
    }

    #[test]
    fn test_delete_version_dir_traversal_no_side_effect() {
        let temp = TempDir::new().unwrap();
        let victim = temp.path().join("etc");
        fs::create_dir(&victim).unwrap();
        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();

        let err = delete_version_dir("test", &root, "../etc", None).unwrap_err();
        assert!(matches!(err, EngineError::Security { .. }));
        assert!(victim.exists());
    }

    #[test]
    fn test_remove_file_with_retries() {
        let temp = TempDir::new().unwrap();
        let f = temp.path().join("x");
        fs::write(&f, b"x").unwrap();
        assert!(remove_file_with_retries(&f, 3));
        // already gone is success
        assert!(remove_file_with_retries(&f, 3));
    }

    #[test]
    fn test_free_disk_space() {
        let temp = TempDir::new().unwrap();
        assert!(free_disk_space(temp.path()).unwrap() > 0);
    }

    #[test]
    fn test_ensure_free_space_floor() {
        let temp = TempDir::new().unwrap();
        // an absurd requirement trips the guard
        let err = ensure_free_space("test", temp.path(), u64::MAX / 2, 0).unwrap_err();
        assert!(matches!(err, EngineError::DiskFull { .. }));
        // a tiny requirement passes
        ensure_free_space("test", temp.path(), 1, 0).unwrap();
    }
}
