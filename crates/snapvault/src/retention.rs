//! Retention planning: which versions a prune pass removes.

use crate::manifest::{VersionEntry, VersionId};

/// Compute the ids a prune pass should delete, given the newest-first
/// version list and the number of unlocked versions to keep.
///
/// Rules, in one pass over the newest-first list:
///
/// - the autosave slot is excluded entirely,
/// - protected entries are never deleted and never consume quota,
/// - the first `max_keep` unlocked entries survive, the rest are returned.
///
/// `max_keep` is clamped to at least 1. Running the plan against a list it
/// already pruned yields nothing, so applying it twice is harmless.
pub fn prune_plan(newest_first: &[&VersionEntry], max_keep: usize) -> Vec<VersionId> {
    let max_keep = max_keep.max(1);
    let mut unlocked_kept = 0usize;
    let mut to_delete = Vec::new();

    for v in newest_first.iter().filter(|v| !v.id.is_autosave()) {
        if v.is_protected {
            continue;
        }
        if unlocked_kept < max_keep {
            unlocked_kept += 1;
        } else {
            to_delete.push(v.id);
        }
    }
    to_delete
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, VersionEntry};

    fn manifest_with(ids: &[(u32, bool)]) -> Manifest {
        let mut m = Manifest::new("/p/a.blend", "u".to_string());
        // newest first
        let mut sorted: Vec<_> = ids.to_vec();
        sorted.sort_by(|a, b| b.0.cmp(&a.0));
        for (n, locked) in sorted {
            let mut e = VersionEntry::new(VersionId::Numbered(n), "t");
            e.is_protected = locked;
            m.versions.push(e);
        }
        m
    }

    fn plan(m: &Manifest, max_keep: usize) -> Vec<VersionId> {
        prune_plan(&m.sorted_versions(true, true), max_keep)
    }

    #[test]
    fn test_keeps_newest_unlocked() {
        let m = manifest_with(&[(1, false), (2, false), (3, false), (4, false)]);
        assert_eq!(
            plan(&m, 2),
            vec![VersionId::Numbered(2), VersionId::Numbered(1)]
        );
    }

    #[test]
    fn test_locked_never_deleted_and_never_counted() {
        // v001 locked: survives, and does not eat quota
        let m = manifest_with(&[(1, true), (2, false), (3, false), (4, false)]);
        assert_eq!(plan(&m, 1), vec![VersionId::Numbered(3), VersionId::Numbered(2)]);
    }

    #[test]
    fn test_autosave_untouched() {
        let mut m = manifest_with(&[(1, false), (2, false)]);
        m.versions.push(VersionEntry::new(VersionId::Autosave, "t"));
        assert_eq!(plan(&m, 1), vec![VersionId::Numbered(1)]);
    }

    #[test]
    fn test_max_keep_clamped_to_one() {
        let m = manifest_with(&[(1, false), (2, false)]);
        assert_eq!(plan(&m, 0), vec![VersionId::Numbered(1)]);
    }

    #[test]
    fn test_idempotent() {
        let m = manifest_with(&[(1, false), (2, false), (3, false)]);
        let first = plan(&m, 2);
        assert_eq!(first, vec![VersionId::Numbered(1)]);

        let mut after = m.clone();
        for id in &first {
            after.remove(*id);
        }
        assert!(plan(&after, 2).is_empty());
    }

    #[test]
    fn test_nothing_to_delete() {
        let m = manifest_with(&[(1, false)]);
        assert!(plan(&m, 5).is_empty());
    }
}
