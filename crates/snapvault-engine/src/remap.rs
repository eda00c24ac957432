//! Relative asset-path rewriting across history depth.
//!
//! A live document stores asset paths relative to its own directory with a
//! `//` marker. A checked-out snapshot sits two directories deeper
//! (`.{stem}_history/<id>/`), so every `//foo` must become `//../../foo` for
//! the document to resolve its assets, and the reverse on the way back out.
//! Absolute paths never move; backslashes are normalized before
//! classification so Windows-authored documents behave.

use snapvault_host::DocumentHost;
use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;

/// Marker prefix of a document-relative asset path.
pub const RELATIVE_PREFIX: &str = "//";

/// Prefix of a path already rewritten to snapshot depth.
pub const SNAPSHOT_DEPTH_PREFIX: &str = "//../../";

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn needs_remap(path: &str) -> bool {
    path.starts_with(RELATIVE_PREFIX) && !path.starts_with(SNAPSHOT_DEPTH_PREFIX)
}

/// Rewrite every shallow relative asset path to snapshot depth. Idempotent:
/// already-deep paths are left alone. Returns how many assets changed.
pub fn remap_to_snapshot_depth(host: &mut dyn DocumentHost) -> Result<usize> {
    let mut changed = 0;
    for asset in host.referenced_assets() {
        let norm = normalize(&asset.path);
        if needs_remap(&norm) {
            let new_path = format!(
                "{}{}",
                SNAPSHOT_DEPTH_PREFIX,
                &norm[RELATIVE_PREFIX.len()..]
            );
            host.set_asset_path(&asset.handle, &new_path)?;
            let _ = host.reload_asset(&asset.handle);
            changed += 1;
        }
    }
    if changed > 0 {
        debug!("remapped {} asset paths to snapshot depth", changed);
    }
    Ok(changed)
}

/// Reverse of [`remap_to_snapshot_depth`]. Returns whether anything changed.
pub fn unmap_from_snapshot_depth(host: &mut dyn DocumentHost) -> Result<bool> {
    let mut changed = false;
    for asset in host.referenced_assets() {
        let norm = normalize(&asset.path);
        if let Some(tail) = norm.strip_prefix(SNAPSHOT_DEPTH_PREFIX) {
            let new_path = format!("{}{}", RELATIVE_PREFIX, tail);
            host.set_asset_path(&asset.handle, &new_path)?;
            let _ = host.reload_asset(&asset.handle);
            changed = true;
        }
    }
    Ok(changed)
}

/// Partial unmap applied only to the given asset handles. Used after pulling
/// a subset of objects out of a snapshot into a live document, where only the
/// freshly introduced references carry snapshot-depth paths.
pub fn fix_retrieved_assets(
    host: &mut dyn DocumentHost,
    handles: &HashSet<String>,
) -> Result<usize> {
    let mut changed = 0;
    for asset in host.referenced_assets() {
        if !handles.contains(&asset.handle) {
            continue;
        }
        let norm = normalize(&asset.path);
        if let Some(tail) = norm.strip_prefix(SNAPSHOT_DEPTH_PREFIX) {
            let new_path = format!("{}{}", RELATIVE_PREFIX, tail);
            host.set_asset_path(&asset.handle, &new_path)?;
            let _ = host.reload_asset(&asset.handle);
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault_host::fakes::MemoryHost;
    use snapvault_host::{AssetKind, AssetRef};

    fn asset(handle: &str, path: &str) -> AssetRef {
        AssetRef {
            handle: handle.to_string(),
            path: path.to_string(),
            kind: AssetKind::Image,
        }
    }

    fn host_with(paths: &[(&str, &str)]) -> MemoryHost {
        MemoryHost::new().with_assets(paths.iter().map(|(h, p)| asset(h, p)).collect())
    }

    #[test]
    fn test_remap_rewrites_shallow_paths() {
        let mut host = host_with(&[
            ("a", "//textures/wood.png"),
            ("b", "/abs/path.png"),
            ("c", "//../../already/deep.png"),
        ]);
        let changed = remap_to_snapshot_depth(&mut host).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            host.asset_paths(),
            vec![
                "//../../textures/wood.png",
                "/abs/path.png",
                "//../../already/deep.png",
            ]
        );
    }

    #[test]
    fn test_remap_is_idempotent() {
        let mut host = host_with(&[("a", "//textures/wood.png")]);
        remap_to_snapshot_depth(&mut host).unwrap();
        let second = remap_to_snapshot_depth(&mut host).unwrap();
        assert_eq!(second, 0);
        assert_eq!(host.asset_paths(), vec!["//../../textures/wood.png"]);
    }

    #[test]
    fn test_remap_normalizes_backslashes() {
        let mut host = host_with(&[("a", "//textures\\wood.png")]);
        remap_to_snapshot_depth(&mut host).unwrap();
        assert_eq!(host.asset_paths(), vec!["//../../textures/wood.png"]);
    }

    #[test]
    fn test_unmap_reverses_remap() {
        let mut host = host_with(&[("a", "//textures/wood.png"), ("b", "/abs.png")]);
        remap_to_snapshot_depth(&mut host).unwrap();
        let changed = unmap_from_snapshot_depth(&mut host).unwrap();
        assert!(changed);
        assert_eq!(
            host.asset_paths(),
            vec!["//textures/wood.png", "/abs.png"]
        );
    }

    #[test]
    fn test_unmap_reports_no_change() {
        let mut host = host_with(&[("a", "//textures/wood.png")]);
        assert!(!unmap_from_snapshot_depth(&mut host).unwrap());
    }

    #[test]
    fn test_fix_retrieved_assets_only_touches_named_handles() {
        let mut host = host_with(&[
            ("old", "//../../kept/deep.png"),
            ("new", "//../../incoming/tex.png"),
        ]);
        let handles: HashSet<String> = ["new".to_string()].into_iter().collect();
        let changed = fix_retrieved_assets(&mut host, &handles).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            host.asset_paths(),
            vec!["//../../kept/deep.png", "//incoming/tex.png"]
        );
    }
}
