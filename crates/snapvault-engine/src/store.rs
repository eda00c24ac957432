//! Manifest persistence: crash-safe load/save with schema back-filling.

use fs2::FileExt;
use serde_json::Value;
use snapvault::{Manifest, SCHEMA_VERSION, layout};
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Loads and saves one history directory's `manifest.json`.
///
/// Reads are forgiving: malformed content is logged and replaced by an
/// in-memory default without touching the file; older manifests are
/// back-filled (schema version, project UUID, parent file, version list) and
/// persisted in place. Writes are atomic — serialized to a sibling temp file
/// and renamed over the target — so a crash never leaves a partial manifest.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        layout::manifest_path(&self.root)
    }

    /// Whether a manifest exists on disk.
    pub fn exists(&self) -> bool {
        self.manifest_path().exists()
    }

    /// Read the manifest, back-filling missing fields.
    ///
    /// `parent_file` seeds the default (and any back-fill) with the current
    /// document path. A missing file yields a fresh manifest, persisted when
    /// `create_if_missing`. Content errors never fail the load.
    pub fn load(&self, parent_file: &str, create_if_missing: bool) -> Result<Manifest> {
        let path = self.manifest_path();
        if !path.exists() {
            let manifest = Manifest::new(parent_file, new_uuid());
            if create_if_missing {
                self.save(&manifest)?;
            }
            return Ok(manifest);
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| EngineError::io("manifest load", &path, e))?;

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!("unreadable manifest {}: {}", path.display(), e);
                return Ok(Manifest::new(parent_file, new_uuid()));
            }
        };

        let Value::Object(mut map) = value else {
            warn!(
                "manifest root is not an object, ignoring: {}",
                path.display()
            );
            return Ok(Manifest::new(parent_file, new_uuid()));
        };

        let mut patched = false;
        if !map.contains_key("schema_version") {
            map.insert("schema_version".to_string(), Value::from(SCHEMA_VERSION));
            patched = true;
        }
        let uuid_ok = map
            .get("project_uuid")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !uuid_ok {
            map.insert("project_uuid".to_string(), Value::from(new_uuid()));
            patched = true;
        }
        if !map.contains_key("parent_file") {
            map.insert("parent_file".to_string(), Value::from(parent_file));
            patched = true;
        }
        if !map.get("versions").is_some_and(Value::is_array) {
            map.insert("versions".to_string(), Value::Array(Vec::new()));
            patched = true;
        }

        let manifest: Manifest = match serde_json::from_value(Value::Object(map)) {
            Ok(m) => m,
            Err(e) => {
                warn!("manifest {} failed to parse: {}", path.display(), e);
                return Ok(Manifest::new(parent_file, new_uuid()));
            }
        };

        if patched {
            debug!("back-filled manifest fields at {}", path.display());
            self.save(&manifest)?;
        }
        Ok(manifest)
    }

    /// Write the manifest atomically, creating the history directory first.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path();
        fs::create_dir_all(&self.root)
            .map_err(|e| EngineError::io("manifest save", &self.root, e))?;
        hide_history_dir(&self.root);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| EngineError::io("manifest save", &self.root, e))?;
        let text = serde_json::to_string_pretty(manifest).map_err(|e| {
            EngineError::ManifestInvalid {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| EngineError::io("manifest save", &path, e))?;
        tmp.persist(&path)
            .map_err(|e| EngineError::io("manifest save", &path, e.error))?;
        Ok(())
    }

    /// Take the per-history advisory lock. Held until the guard drops.
    pub fn lock(&self) -> Result<StoreLock> {
        let path = layout::lock_path(&self.root);
        fs::create_dir_all(&self.root)
            .map_err(|e| EngineError::io("manifest lock", &self.root, e))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| EngineError::io("manifest lock", &path, e))?;
        file.lock_exclusive()
            .map_err(|e| EngineError::io("manifest lock", &path, e))?;
        Ok(StoreLock { file })
    }

    /// Locked load→mutate→save. The closure's error aborts the save and the
    /// on-disk manifest stays as it was.
    pub fn update<T>(
        &self,
        parent_file: &str,
        f: impl FnOnce(&mut Manifest) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.lock()?;
        let mut manifest = self.load(parent_file, false)?;
        let out = f(&mut manifest)?;
        self.save(&manifest)?;
        Ok(out)
    }
}

/// Guard for the history lock file; releases on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// History directories are dot-prefixed, which hides them everywhere but
/// Windows; there the hidden attribute has to be set explicitly.
#[cfg(windows)]
fn hide_history_dir(dir: &Path) {
    let _ = std::process::Command::new("attrib")
        .arg("+h")
        .arg(dir)
        .status();
}

#[cfg(not(windows))]
fn hide_history_dir(_dir: &Path) {}
