use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::layout::{self, LayoutError};

/// Current manifest schema version. Bumped when the on-disk shape changes in
/// a way readers must know about; older manifests are back-filled in place.
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Version identifiers
// ============================================================================

/// Identifier of a single version inside a history directory.
///
/// Rendered as `v{NNN}` (zero-padded to three digits, widening only for
/// legacy identifiers above the ceiling) or the literal `autosave`. The
/// autosave slot is special everywhere: it is overwritten in place, never
/// protectable, and never counts against the retention quota.
///
/// Ordering places `autosave` before every numbered id, so a descending
/// (newest-first) sort lists it last.
///
/// ```
/// use snapvault::VersionId;
///
/// let id: VersionId = "v042".parse().unwrap();
/// assert_eq!(id, VersionId::Numbered(42));
/// assert_eq!(id.to_string(), "v042");
/// assert!(VersionId::Autosave < id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionId {
    Autosave,
    Numbered(u32),
}

impl VersionId {
    /// Whether this is the autosave slot.
    pub fn is_autosave(&self) -> bool {
        matches!(self, VersionId::Autosave)
    }

    /// The numeric component, if any.
    pub fn number(&self) -> Option<u32> {
        match self {
            VersionId::Numbered(n) => Some(*n),
            VersionId::Autosave => None,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionId::Autosave => write!(f, "autosave"),
            VersionId::Numbered(n) => write!(f, "v{:03}", n),
        }
    }
}

/// Error parsing a version identifier string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version id: {0:?}")]
pub struct ParseVersionIdError(pub String);

impl FromStr for VersionId {
    type Err = ParseVersionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "autosave" {
            return Ok(VersionId::Autosave);
        }
        let digits = s
            .strip_prefix('v')
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| ParseVersionIdError(s.to_string()))?;
        digits
            .parse::<u32>()
            .map(VersionId::Numbered)
            .map_err(|_| ParseVersionIdError(s.to_string()))
    }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ============================================================================
// Tags
// ============================================================================

/// User-assigned marker on a version entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VersionTag {
    #[default]
    None,
    Stable,
    Milestone,
    Experiment,
    Bug,
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionTag::None => "none",
            VersionTag::Stable => "stable",
            VersionTag::Milestone => "milestone",
            VersionTag::Experiment => "experiment",
            VersionTag::Bug => "bug",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VersionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(VersionTag::None),
            "stable" => Ok(VersionTag::Stable),
            "milestone" => Ok(VersionTag::Milestone),
            "experiment" => Ok(VersionTag::Experiment),
            "bug" => Ok(VersionTag::Bug),
            _ => Err(format!("unknown tag: {:?}", s)),
        }
    }
}

// ============================================================================
// Version entries
// ============================================================================

/// One recorded snapshot in the manifest.
///
/// `thumbnail` and the snapshot blob path are POSIX-relative to the history
/// directory. The blob field is named `blend` on the wire for compatibility
/// with existing manifests.
///
/// # JSON shape
///
/// ```json
/// {
///   "id": "v001",
///   "timestamp": "2026-08-07 10:15:00",
///   "note": "Initial",
///   "thumbnail": "v001/thumbnail.png",
///   "blend": "v001/snapshot.blend_snapshot",
///   "object_count": 12,
///   "file_size": 104857600,
///   "is_protected": false,
///   "tag": "NONE"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: VersionId,

    /// Human-readable local time at commit.
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Relative path of the snapshot blob under the history directory.
    #[serde(default, rename = "blend", skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u64>,

    #[serde(default)]
    pub file_size: u64,

    #[serde(default)]
    pub is_protected: bool,

    #[serde(default)]
    pub tag: VersionTag,

    /// Fields this build does not know about; preserved on rewrite.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl VersionEntry {
    /// Create a bare entry for the given id and commit time.
    pub fn new(id: VersionId, timestamp: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: timestamp.into(),
            note: None,
            thumbnail: None,
            snapshot: None,
            object_count: None,
            file_size: 0,
            is_protected: false,
            tag: VersionTag::None,
            extra: HashMap::new(),
        }
    }

    /// Set the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set the snapshot blob path (relative to the history directory).
    pub fn with_snapshot(mut self, rel: impl Into<String>) -> Self {
        self.snapshot = Some(rel.into());
        self
    }

    /// Set the thumbnail path (relative to the history directory).
    pub fn with_thumbnail(mut self, rel: impl Into<String>) -> Self {
        self.thumbnail = Some(rel.into());
        self
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// The per-project history index, stored as `manifest.json` in the history
/// directory.
///
/// `versions` is kept newest first when persisted. Unknown top-level fields
/// survive a read/write cycle via `extra`.
///
/// # JSON shape
///
/// ```json
/// {
///   "schema_version": 1,
///   "project_uuid": "7c8a0c1e-46f5-4d31-9e56-2f8a3be0a11d",
///   "parent_file": "/prj/Scene.blend",
///   "versions": [ { "id": "v002", … }, { "id": "v001", … } ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,

    /// Stable project identity, assigned on first write.
    pub project_uuid: String,

    /// POSIX path of the live document this history belongs to. Informational;
    /// the project is identified by filesystem location, not by this field.
    pub parent_file: String,

    /// Newest first.
    #[serde(default)]
    pub versions: Vec<VersionEntry>,

    /// Fields this build does not know about; preserved on rewrite.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Manifest {
    /// Create an empty manifest for the given document.
    pub fn new(parent_file: impl Into<String>, project_uuid: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            project_uuid,
            parent_file: parent_file.into(),
            versions: Vec::new(),
            extra: HashMap::new(),
        }
    }

    /// Entries ordered by id.
    ///
    /// Numbered ids order numerically; the autosave slot sorts last when
    /// `newest_first` and first otherwise. `include_autosave` drops the
    /// autosave entry entirely when false.
    pub fn sorted_versions(&self, newest_first: bool, include_autosave: bool) -> Vec<&VersionEntry> {
        let mut out: Vec<&VersionEntry> = self
            .versions
            .iter()
            .filter(|v| include_autosave || !v.id.is_autosave())
            .collect();
        out.sort_by_key(|v| v.id);
        if newest_first {
            out.reverse();
        }
        out
    }

    /// Look up an entry by id.
    pub fn find(&self, id: VersionId) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Look up an entry by id, mutably.
    pub fn find_mut(&mut self, id: VersionId) -> Option<&mut VersionEntry> {
        self.versions.iter_mut().find(|v| v.id == id)
    }

    /// Remove and return the entry with the given id.
    pub fn remove(&mut self, id: VersionId) -> Option<VersionEntry> {
        let idx = self.versions.iter().position(|v| v.id == id)?;
        Some(self.versions.remove(idx))
    }

    /// Prepend an entry, keeping the newest-first invariant.
    pub fn insert_newest(&mut self, entry: VersionEntry) {
        self.versions.insert(0, entry);
    }

    /// Allocate the next numbered id.
    pub fn next_id(&self) -> Result<VersionId, LayoutError> {
        layout::next_version_id(self.versions.iter().map(|v| &v.id))
    }
}

// ============================================================================
// Tests
// ============================================================================
