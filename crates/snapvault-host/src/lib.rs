#![doc = include_str!("../README.md")]

use snapvault::ObjectState;
use std::path::{Path, PathBuf};

// ── Error ────────────────────────────────────────────────────────────

/// Errors from host capability calls.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host does not support {0}")]
    Unsupported(&'static str),

    #[error("host error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HostError>;

// ── Asset and editing state types ────────────────────────────────────

/// Kind of an externally referenced asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Library,
    Cache,
    Font,
    Sound,
    Other(String),
}

/// One externally referenced asset as the host currently sees it.
///
/// `handle` is an opaque host-side identifier that stays valid for the
/// duration of one engine action; `path` is the asset path exactly as stored
/// in the document (relative paths keep their `//` marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub handle: String,
    pub path: String,
    pub kind: AssetKind,
}

/// Interaction mode the host is currently in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Object,
    EditMesh,
    Sculpt,
    VertexPaint,
    WeightPaint,
    TexturePaint,
    Other(String),
}

impl Default for EditMode {
    fn default() -> Self {
        EditMode::Object
    }
}

impl EditMode {
    /// Modes in which an autosave would capture a half-edited document.
    pub fn inhibits_autosave(&self) -> bool {
        matches!(
            self,
            EditMode::EditMesh
                | EditMode::Sculpt
                | EditMode::VertexPaint
                | EditMode::WeightPaint
                | EditMode::TexturePaint
        )
    }
}

// ── DocumentHost ─────────────────────────────────────────────────────

/// The document side of the host application.
///
/// Everything the engine needs to know about or do to the live document goes
/// through this trait. Methods a host cannot provide default to
/// [`HostError::Unsupported`] (or a harmless empty answer for read-only
/// queries), so minimal hosts — a plain-file CLI, a test fake — implement
/// only the core open/save surface.
pub trait DocumentHost {
    /// Path of the currently open document, if it has ever been saved.
    fn current_path(&self) -> Option<PathBuf>;

    /// Whether the document has unsaved changes.
    fn is_dirty(&self) -> bool;

    /// Save the document at its current path.
    fn save_in_place(&mut self) -> Result<()>;

    /// Save the document at `path` and make that the current path.
    fn save_as(&mut self, path: &Path) -> Result<()>;

    /// Write a copy of the document to `path`, leaving the current path
    /// untouched.
    fn save_as_copy(&mut self, path: &Path) -> Result<()>;

    /// Open the document at `path`, replacing the current one.
    fn open(&mut self, path: &Path) -> Result<()>;

    /// Externally referenced assets in the open document.
    fn referenced_assets(&self) -> Vec<AssetRef> {
        Vec::new()
    }

    /// Rewrite one asset's stored path.
    fn set_asset_path(&mut self, _handle: &str, _new_path: &str) -> Result<()> {
        Err(HostError::Unsupported("set_asset_path"))
    }

    /// Ask the host to reload an asset after its path changed. Best-effort;
    /// hosts may ignore this.
    fn reload_asset(&mut self, _handle: &str) -> Result<()> {
        Ok(())
    }

    /// Current interaction mode.
    fn edit_mode(&self) -> EditMode {
        EditMode::Object
    }

    /// Whether a render is in flight.
    fn is_render_active(&self) -> bool {
        false
    }

    /// Free-form description of what is being edited, used to default a
    /// commit note.
    fn editing_context(&self) -> Option<String> {
        None
    }

    /// Names of all objects in the open document.
    fn object_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Geometry summaries for all objects in the open document, used for
    /// per-snapshot object records.
    fn object_summaries(&self) -> Vec<(String, ObjectState)> {
        Vec::new()
    }

    /// Enumerate objects stored in another document file without opening it.
    fn list_objects(&self, _doc: &Path) -> Result<Vec<String>> {
        Err(HostError::Unsupported("list_objects"))
    }

    /// Append the named objects (and their dependencies) from another
    /// document file into the open document. Returns how many datablocks
    /// were brought in.
    fn append_objects(&mut self, _from: &Path, _names: &[String]) -> Result<usize> {
        Err(HostError::Unsupported("append_objects"))
    }

    /// Make all linked data local to the open document.
    fn localize_linked_data(&mut self) -> Result<()> {
        Err(HostError::Unsupported("localize_linked_data"))
    }

    /// Clear per-asset bookkeeping marks after localizing.
    fn clear_asset_marks(&mut self) -> Result<()> {
        Err(HostError::Unsupported("clear_asset_marks"))
    }
}

// ── ThumbnailCapture ─────────────────────────────────────────────────

/// Optional preview capture.
pub trait ThumbnailCapture {
    /// PNG bytes for the current viewport, no larger than `max_dim` on the
    /// longer side. `None` means the host declined (headless, no viewport).
    fn capture_png(&self, max_dim: u32) -> Option<Vec<u8>>;
}

// ── Trash ────────────────────────────────────────────────────────────

/// Platform trash routing.
pub trait Trash {
    fn send_to_trash(&self, path: &Path) -> Result<()>;
}

// ── Runner ───────────────────────────────────────────────────────────

/// Status of an external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Exited(i32),
    Failed(String),
}

/// Handle to a launched external process.
pub trait ProcessHandle {
    /// Non-blocking status check.
    fn poll(&mut self) -> ProcessStatus;

    /// Terminate the process.
    fn kill(&mut self) -> Result<()>;
}

/// Launches external commands (renders, exports) with captured output.
pub trait Runner {
    fn run(
        &self,
        cmd: &[String],
        env: &[(String, String)],
        stdout_path: &Path,
        stderr_path: &Path,
    ) -> Result<Box<dyn ProcessHandle>>;
}

// ── Fakes ────────────────────────────────────────────────────────────

pub mod fakes {
    //! In-memory capability implementations for unit tests.
    //!
    //! `MemoryHost` models the document as an opaque byte buffer plus an
    //! object/asset table; saves write real files so engine tests can run
    //! against `tempfile::TempDir` fixtures.

    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::sync::Mutex;

    /// A fake document host backed by a byte buffer.
    #[derive(Debug, Default)]
    pub struct MemoryHost {
        current: Option<PathBuf>,
        content: Vec<u8>,
        dirty: bool,
        assets: Vec<AssetRef>,
        objects: BTreeMap<String, ObjectState>,
        edit_mode: EditMode,
        render_active: bool,
        editing_context: Option<String>,
        /// Objects reported for any foreign document in `list_objects`.
        snapshot_objects: Vec<String>,
        /// Assets introduced by the next `append_objects` call.
        import_assets: Vec<AssetRef>,
        /// Paths passed to `open`, newest last.
        pub opened: Vec<PathBuf>,
    }

    impl MemoryHost {
        pub fn new() -> Self {
            Self {
                content: b"DOC".to_vec(),
                ..Default::default()
            }
        }

        pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
            self.current = Some(path.into());
            self
        }

        pub fn with_content(mut self, content: Vec<u8>) -> Self {
            self.content = content;
            self
        }

        pub fn with_dirty(mut self, dirty: bool) -> Self {
            self.dirty = dirty;
            self
        }

        pub fn with_assets(mut self, assets: Vec<AssetRef>) -> Self {
            self.assets = assets;
            self
        }

        pub fn with_objects(mut self, objects: Vec<(String, ObjectState)>) -> Self {
            self.objects = objects.into_iter().collect();
            self
        }

        pub fn with_edit_mode(mut self, mode: EditMode) -> Self {
            self.edit_mode = mode;
            self
        }

        pub fn with_render_active(mut self, active: bool) -> Self {
            self.render_active = active;
            self
        }

        pub fn with_editing_context(mut self, ctx: impl Into<String>) -> Self {
            self.editing_context = Some(ctx.into());
            self
        }

        pub fn with_snapshot_objects(mut self, names: Vec<String>) -> Self {
            self.snapshot_objects = names;
            self
        }

        pub fn with_import_assets(mut self, assets: Vec<AssetRef>) -> Self {
            self.import_assets = assets;
            self
        }

        pub fn set_dirty(&mut self, dirty: bool) {
            self.dirty = dirty;
        }

        pub fn set_content(&mut self, content: Vec<u8>) {
            self.content = content;
            self.dirty = true;
        }

        pub fn content(&self) -> &[u8] {
            &self.content
        }

        pub fn asset_paths(&self) -> Vec<String> {
            self.assets.iter().map(|a| a.path.clone()).collect()
        }
    }

    impl DocumentHost for MemoryHost {
        fn current_path(&self) -> Option<PathBuf> {
            self.current.clone()
        }

        fn is_dirty(&self) -> bool {
            self.dirty
        }

        fn save_in_place(&mut self) -> Result<()> {
            let path = self
                .current
                .clone()
                .ok_or(HostError::Unsupported("save_in_place on unsaved document"))?;
            fs::write(path, &self.content)?;
            self.dirty = false;
            Ok(())
        }

        fn save_as(&mut self, path: &Path) -> Result<()> {
            fs::write(path, &self.content)?;
            self.current = Some(path.to_path_buf());
            self.dirty = false;
            Ok(())
        }

        fn save_as_copy(&mut self, path: &Path) -> Result<()> {
            fs::write(path, &self.content)?;
            Ok(())
        }

        fn open(&mut self, path: &Path) -> Result<()> {
            self.content = fs::read(path)?;
            self.current = Some(path.to_path_buf());
            self.opened.push(path.to_path_buf());
            self.dirty = false;
            Ok(())
        }

        fn referenced_assets(&self) -> Vec<AssetRef> {
            self.assets.clone()
        }

        fn set_asset_path(&mut self, handle: &str, new_path: &str) -> Result<()> {
            let asset = self
                .assets
                .iter_mut()
                .find(|a| a.handle == handle)
                .ok_or_else(|| HostError::Other(format!("unknown asset handle: {}", handle)))?;
            asset.path = new_path.to_string();
            Ok(())
        }

        fn edit_mode(&self) -> EditMode {
            self.edit_mode.clone()
        }

        fn is_render_active(&self) -> bool {
            self.render_active
        }

        fn editing_context(&self) -> Option<String> {
            self.editing_context.clone()
        }

        fn object_names(&self) -> Vec<String> {
            self.objects.keys().cloned().collect()
        }

        fn object_summaries(&self) -> Vec<(String, ObjectState)> {
            self.objects
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }

        fn list_objects(&self, _doc: &Path) -> Result<Vec<String>> {
            Ok(self.snapshot_objects.clone())
        }

        fn append_objects(&mut self, _from: &Path, names: &[String]) -> Result<usize> {
            let mut appended = 0;
            for name in names {
                if !self.snapshot_objects.contains(name) {
                    return Err(HostError::Other(format!(
                        "object not present in snapshot: {}",
                        name
                    )));
                }
                self.objects
                    .entry(name.clone())
                    .or_insert_with(|| ObjectState::new([0.0; 16], [[0.0; 3]; 2], 0));
                appended += 1;
            }
            self.assets.append(&mut self.import_assets);
            self.dirty = true;
            Ok(appended)
        }

        fn localize_linked_data(&mut self) -> Result<()> {
            Ok(())
        }

        fn clear_asset_marks(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Thumbnail capture returning a fixed byte blob.
    pub struct StaticThumbnails(pub Vec<u8>);

    impl ThumbnailCapture for StaticThumbnails {
        fn capture_png(&self, _max_dim: u32) -> Option<Vec<u8>> {
            Some(self.0.clone())
        }
    }

    /// Thumbnail capture that always declines.
    pub struct NoThumbnails;

    impl ThumbnailCapture for NoThumbnails {
        fn capture_png(&self, _max_dim: u32) -> Option<Vec<u8>> {
            None
        }
    }

    /// Trash that records what was sent and removes it from disk.
    #[derive(Default)]
    pub struct RecordingTrash {
        pub sent: Mutex<Vec<PathBuf>>,
        /// When true, every call fails — for exercising fallbacks.
        pub fail: bool,
    }

    impl RecordingTrash {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent_paths(&self) -> Vec<PathBuf> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Trash for RecordingTrash {
        fn send_to_trash(&self, path: &Path) -> Result<()> {
            if self.fail {
                return Err(HostError::Other("trash unavailable".to_string()));
            }
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            self.sent.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    /// A process handle that replays a scripted status sequence.
    pub struct ScriptedProcess {
        statuses: Vec<ProcessStatus>,
        pub killed: bool,
    }

    impl ProcessHandle for ScriptedProcess {
        fn poll(&mut self) -> ProcessStatus {
            if self.statuses.len() > 1 {
                self.statuses.remove(0)
            } else {
                self.statuses
                    .first()
                    .cloned()
                    .unwrap_or(ProcessStatus::Exited(0))
            }
        }

        fn kill(&mut self) -> Result<()> {
            self.killed = true;
            self.statuses = vec![ProcessStatus::Failed("killed".to_string())];
            Ok(())
        }
    }

    /// Runner that hands out scripted processes and records launches.
    #[derive(Default)]
    pub struct ScriptedRunner {
        pub launched: Mutex<Vec<Vec<String>>>,
        /// Statuses each launched process steps through; the last repeats.
        pub script: Vec<ProcessStatus>,
    }

    impl ScriptedRunner {
        pub fn new(script: Vec<ProcessStatus>) -> Self {
            Self {
                launched: Mutex::new(Vec::new()),
                script,
            }
        }
    }

    impl Runner for ScriptedRunner {
        fn run(
            &self,
            cmd: &[String],
            _env: &[(String, String)],
            stdout_path: &Path,
            stderr_path: &Path,
        ) -> Result<Box<dyn ProcessHandle>> {
            fs::write(stdout_path, b"")?;
            fs::write(stderr_path, b"")?;
            self.launched.lock().unwrap().push(cmd.to_vec());
            Ok(Box::new(ScriptedProcess {
                statuses: self.script.clone(),
                killed: false,
            }))
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_edit_mode_inhibition() {
        assert!(!EditMode::Object.inhibits_autosave());
        assert!(EditMode::EditMesh.inhibits_autosave());
        assert!(EditMode::Sculpt.inhibits_autosave());
        assert!(EditMode::TexturePaint.inhibits_autosave());
        assert!(!EditMode::Other("pose".into()).inhibits_autosave());
    }

    #[test]
    fn test_memory_host_save_and_open() {
        let temp = TempDir::new().unwrap();
        let doc = temp.path().join("a.blend");
        let copy = temp.path().join("b.blend");

        let mut host = MemoryHost::new()
            .with_path(&doc)
            .with_content(b"hello".to_vec());
        host.save_in_place().unwrap();
        host.save_as_copy(&copy).unwrap();
        assert_eq!(std::fs::read(&copy).unwrap(), b"hello");
        assert_eq!(host.current_path(), Some(doc.clone()));

        host.set_content(b"changed".to_vec());
        assert!(host.is_dirty());
        host.open(&copy).unwrap();
        assert!(!host.is_dirty());
        assert_eq!(host.content(), b"hello");
        assert_eq!(host.current_path(), Some(copy));
    }

    #[test]
    fn test_memory_host_save_as_switches_path() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("fork.blend");
        let mut host = MemoryHost::new().with_path(temp.path().join("a.blend"));
        host.save_as(&target).unwrap();
        assert_eq!(host.current_path(), Some(target));
    }

    #[test]
    fn test_memory_host_asset_rewrite() {
        let mut host = MemoryHost::new().with_assets(vec![AssetRef {
            handle: "img1".into(),
            path: "//textures/wood.png".into(),
            kind: AssetKind::Image,
        }]);
        host.set_asset_path("img1", "//../../textures/wood.png").unwrap();
        assert_eq!(host.asset_paths(), vec!["//../../textures/wood.png"]);
        assert!(host.set_asset_path("missing", "//x").is_err());
    }

    #[test]
    fn test_memory_host_append_objects() {
        let mut host = MemoryHost::new()
            .with_snapshot_objects(vec!["Cube".into(), "Lamp".into()]);
        let n = host
            .append_objects(Path::new("/tmp/x"), &["Cube".to_string()])
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(host.object_names(), vec!["Cube".to_string()]);
        assert!(
            host.append_objects(Path::new("/tmp/x"), &["Ghost".to_string()])
                .is_err()
        );
    }

    #[test]
    fn test_recording_trash() {
        let temp = TempDir::new().unwrap();
        let victim = temp.path().join("gone");
        std::fs::create_dir(&victim).unwrap();

        let trash = RecordingTrash::new();
        trash.send_to_trash(&victim).unwrap();
        assert!(!victim.exists());
        assert_eq!(trash.sent_paths(), vec![victim]);

        let failing = RecordingTrash::failing();
        assert!(failing.send_to_trash(temp.path()).is_err());
    }

    #[test]
    fn test_scripted_runner() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(vec![
            ProcessStatus::Running,
            ProcessStatus::Exited(0),
        ]);
        let mut handle = runner
            .run(
                &["render".to_string()],
                &[],
                &temp.path().join("out.log"),
                &temp.path().join("err.log"),
            )
            .unwrap();
        assert_eq!(handle.poll(), ProcessStatus::Running);
        assert_eq!(handle.poll(), ProcessStatus::Exited(0));
        assert_eq!(handle.poll(), ProcessStatus::Exited(0));
        assert_eq!(runner.launched.lock().unwrap().len(), 1);
    }
}
