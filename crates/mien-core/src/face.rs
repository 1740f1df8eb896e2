//! Face records and the per-request query and update types built from them.
//!
//! Faces are produced by the detection pipeline and never created or deleted
//! here. The only mutation is the subject link carried by [`FaceUpdate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Records ─────────────────────────────────────────────────────────────────

/// A detected facial signature, optionally linked to a subject.
///
/// Serialised with the field names clients of the media library expect
/// (`ID`, `SubjUID`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
  #[serde(rename = "ID")]
  pub id:               String,
  /// Which detector produced the face, e.g. `"auto"` or `"manual"`.
  #[serde(rename = "Src")]
  pub face_src:         String,
  #[serde(rename = "Hidden")]
  pub hidden:           bool,
  #[serde(rename = "SubjUID")]
  pub subj_uid:         Option<String>,
  #[serde(rename = "Samples")]
  pub samples:          u32,
  #[serde(rename = "SampleRadius")]
  pub sample_radius:    f64,
  #[serde(rename = "Collisions")]
  pub collisions:       u32,
  #[serde(rename = "CollisionRadius")]
  pub collision_radius: f64,
  #[serde(rename = "MatchedAt")]
  pub matched_at:       Option<DateTime<Utc>>,
  #[serde(rename = "CreatedAt")]
  pub created_at:       DateTime<Utc>,
  #[serde(rename = "UpdatedAt")]
  pub updated_at:       DateTime<Utc>,
  /// Present only when the query asked for markers.
  #[serde(rename = "Markers", default, skip_serializing_if = "Option::is_none")]
  pub markers:          Option<Vec<Marker>>,
}

/// Positional data locating a face inside one file.
///
/// Coordinates are relative to the image size, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
  #[serde(rename = "UID")]
  pub uid:      String,
  #[serde(rename = "FileUID")]
  pub file_uid: String,
  #[serde(rename = "SubjUID")]
  pub subj_uid: Option<String>,
  #[serde(rename = "X")]
  pub x:        f64,
  #[serde(rename = "Y")]
  pub y:        f64,
  #[serde(rename = "W")]
  pub w:        f64,
  #[serde(rename = "H")]
  pub h:        f64,
  #[serde(rename = "Score")]
  pub score:    i32,
  #[serde(rename = "Invalid")]
  pub invalid:  bool,
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters and pagination for a face search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceSearchQuery {
  /// Exact face identifier; yields at most one match.
  pub id:      Option<String>,
  /// Exact subject identifier.
  pub subject: Option<String>,
  /// Only faces without a subject.
  pub unknown: bool,
  /// Also return faces hidden by the user.
  pub hidden:  bool,
  /// Embed each face's markers in the result.
  pub markers: bool,
  /// Maximum number of results. The backend decides what `0` means.
  pub count:   usize,
  pub offset:  usize,
}

impl FaceSearchQuery {
  /// The query used to fetch a single face: identifier fixed, markers on.
  pub fn by_id(id: impl Into<String>) -> Self {
    Self {
      id: Some(id.into()),
      markers: true,
      ..Self::default()
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// A request to relink one face to a subject.
///
/// `face_id` always comes from the route; only `subj_uid` comes from the
/// client body. `None` clears the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceUpdate {
  pub face_id:  String,
  pub subj_uid: Option<String>,
}

impl FaceUpdate {
  /// Build an update, treating an empty subject identifier as "unlink".
  pub fn new(face_id: impl Into<String>, subj_uid: Option<String>) -> Self {
    Self {
      face_id:  face_id.into(),
      subj_uid: subj_uid.filter(|s| !s.is_empty()),
    }
  }
}
