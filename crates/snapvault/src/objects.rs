//! Per-object change classification across snapshots.
//!
//! Each snapshot may carry a compact summary of every object in the document:
//! world matrix, bounding box, and vertex count, all rounded to four decimal
//! places so float jitter does not register as a change. Comparing one
//! object's summaries oldest to newest yields a change-type timeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::manifest::VersionId;

/// Summary of one object in one snapshot.
///
/// Floats are rounded to 4 decimal places before storage and comparison;
/// equality between two summaries is exact equality on the rounded values.
///
/// # JSON shape (one entry of `<id>_objects.json`)
///
/// ```json
/// { "matrix": [1.0, 0.0, …], "bbox": [[-1.0, -1.0, 0.0], [1.0, 1.0, 2.0]], "v_count": 508 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Row-major 4×4 world matrix.
    pub matrix: [f64; 16],

    /// Axis-aligned bounds: `[min, max]`.
    pub bbox: [[f64; 3]; 2],

    /// Vertex count.
    pub v_count: u64,
}

impl ObjectState {
    pub fn new(matrix: [f64; 16], bbox: [[f64; 3]; 2], v_count: u64) -> Self {
        Self {
            matrix,
            bbox,
            v_count,
        }
        .rounded()
    }

    /// Copy with every float rounded to 4 decimal places.
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        for v in out.matrix.iter_mut() {
            *v = round4(*v);
        }
        for corner in out.bbox.iter_mut() {
            for v in corner.iter_mut() {
                *v = round4(*v);
            }
        }
        out
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

// ============================================================================
// Classification
// ============================================================================

/// What kind of change a snapshot recorded for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// First appearance of the object.
    Created,
    /// Vertex count changed.
    Major,
    /// Bounding box changed with the vertex count intact.
    Minor,
    /// Only the world matrix changed.
    Moved,
    /// Present and identical to the previous state. Hidden by default.
    Record,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "Created",
            ChangeKind::Major => "Major",
            ChangeKind::Minor => "Minor",
            ChangeKind::Moved => "Moved",
            ChangeKind::Record => "Record",
        };
        write!(f, "{}", s)
    }
}

/// One classified point on an object's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectChange {
    pub version: VersionId,
    pub kind: ChangeKind,
    /// Human-readable detail: signed vertex delta, "Shape Modified", etc.
    pub detail: String,
}

/// Classify one object's states across snapshots.
///
/// `series` is oldest→newest; `None` marks a snapshot where the object is
/// absent (absent snapshots produce no timeline entry — after a gap the
/// object is compared against its last known state). The result is returned
/// newest first. `Record` entries are dropped unless `include_records`.
pub fn classify_history(
    series: &[(VersionId, Option<&ObjectState>)],
    include_records: bool,
) -> Vec<ObjectChange> {
    let mut out = Vec::new();
    let mut prev: Option<ObjectState> = None;

    for (version, state) in series {
        let Some(state) = state else { continue };
        let state = state.rounded();

        let change = match &prev {
            None => ObjectChange {
                version: *version,
                kind: ChangeKind::Created,
                detail: "Created".to_string(),
            },
            Some(p) if p.v_count != state.v_count => ObjectChange {
                version: *version,
                kind: ChangeKind::Major,
                detail: format!(
                    "Vertices {:+}",
                    state.v_count as i64 - p.v_count as i64
                ),
            },
            Some(p) if p.bbox != state.bbox => ObjectChange {
                version: *version,
                kind: ChangeKind::Minor,
                detail: "Shape Modified".to_string(),
            },
            Some(p) if p.matrix != state.matrix => ObjectChange {
                version: *version,
                kind: ChangeKind::Moved,
                detail: "Moved".to_string(),
            },
            Some(_) => ObjectChange {
                version: *version,
                kind: ChangeKind::Record,
                detail: "Recorded".to_string(),
            },
        };

        prev = Some(state);
        if change.kind != ChangeKind::Record || include_records {
            out.push(change);
        }
    }

    out.reverse();
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    fn state(v_count: u64) -> ObjectState {
        ObjectState::new(IDENTITY, [[0.0; 3], [1.0; 3]], v_count)
    }

    fn moved(v_count: u64) -> ObjectState {
        let mut m = IDENTITY;
        m[3] = 5.0;
        ObjectState::new(m, [[0.0; 3], [1.0; 3]], v_count)
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.23456789), 1.2346);
        assert_eq!(round4(-0.00004), -0.0);
        assert_eq!(round4(2.0), 2.0);
    }

    #[test]
    fn test_rounding_absorbs_jitter() {
        let a = ObjectState::new(IDENTITY, [[0.0; 3], [1.0; 3]], 8);
        let mut m = IDENTITY;
        m[0] = 1.000_000_01;
        let b = ObjectState::new(m, [[0.0; 3], [1.0; 3]], 8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_appearance_is_created() {
        let s = state(8);
        let series = vec![(VersionId::Numbered(1), Some(&s))];
        let changes = classify_history(&series, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Created);
        assert_eq!(changes[0].version, VersionId::Numbered(1));
    }

    #[test]
    fn test_vertex_delta_is_major() {
        let a = state(8);
        let b = state(20);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), Some(&b)),
        ];
        let changes = classify_history(&series, false);
        // newest first
        assert_eq!(changes[0].kind, ChangeKind::Major);
        assert_eq!(changes[0].detail, "Vertices +12");
        assert_eq!(changes[1].kind, ChangeKind::Created);
    }

    #[test]
    fn test_negative_vertex_delta() {
        let a = state(20);
        let b = state(8);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), Some(&b)),
        ];
        let changes = classify_history(&series, false);
        assert_eq!(changes[0].detail, "Vertices -12");
    }

    #[test]
    fn test_bbox_change_is_minor() {
        let a = state(8);
        let b = ObjectState::new(IDENTITY, [[0.0; 3], [2.0; 3]], 8);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), Some(&b)),
        ];
        let changes = classify_history(&series, false);
        assert_eq!(changes[0].kind, ChangeKind::Minor);
        assert_eq!(changes[0].detail, "Shape Modified");
    }

    #[test]
    fn test_matrix_change_is_moved() {
        let a = state(8);
        let b = moved(8);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), Some(&b)),
        ];
        let changes = classify_history(&series, false);
        assert_eq!(changes[0].kind, ChangeKind::Moved);
    }

    #[test]
    fn test_records_hidden_by_default() {
        let a = state(8);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), Some(&a)),
            (VersionId::Numbered(3), Some(&a)),
        ];
        let hidden = classify_history(&series, false);
        assert_eq!(hidden.len(), 1);

        let shown = classify_history(&series, true);
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[0].kind, ChangeKind::Record);
        assert_eq!(shown[0].version, VersionId::Numbered(3));
    }

    #[test]
    fn test_gap_compares_against_last_known_state() {
        let a = state(8);
        let b = state(12);
        let series = vec![
            (VersionId::Numbered(1), Some(&a)),
            (VersionId::Numbered(2), None),
            (VersionId::Numbered(3), Some(&b)),
        ];
        let changes = classify_history(&series, false);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind, ChangeKind::Major);
        assert_eq!(changes[0].version, VersionId::Numbered(3));
    }

    #[test]
    fn test_state_serde_compact() {
        let s = state(8);
        let json = serde_json::to_string(&s).unwrap();
        let back: ObjectState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
        assert!(json.contains("\"v_count\":8"));
    }
}
