//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Permission lists are stored
//! as compact JSON arrays. Session tokens are stored as hex SHA-256 digests.

use chrono::{DateTime, Utc};
use mien_core::{
  acl::Permission,
  face::{Face, Marker},
};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Permissions ─────────────────────────────────────────────────────────────

pub fn encode_permissions(perms: &[Permission]) -> Result<String> {
  Ok(serde_json::to_string(perms)?)
}

pub fn decode_permissions(s: &str) -> Result<Vec<Permission>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawFace::from_row`].
pub const FACE_COLUMNS: &str = "f.face_id, f.face_src, f.face_hidden, f.subj_uid,
  f.samples, f.sample_radius, f.collisions, f.collision_radius,
  f.matched_at, f.created_at, f.updated_at";

/// Raw values read directly from a `faces` row.
pub struct RawFace {
  pub face_id:          String,
  pub face_src:         String,
  pub face_hidden:      bool,
  pub subj_uid:         Option<String>,
  pub samples:          u32,
  pub sample_radius:    f64,
  pub collisions:       u32,
  pub collision_radius: f64,
  pub matched_at:       Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawFace {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      face_id:          row.get(0)?,
      face_src:         row.get(1)?,
      face_hidden:      row.get(2)?,
      subj_uid:         row.get(3)?,
      samples:          row.get(4)?,
      sample_radius:    row.get(5)?,
      collisions:       row.get(6)?,
      collision_radius: row.get(7)?,
      matched_at:       row.get(8)?,
      created_at:       row.get(9)?,
      updated_at:       row.get(10)?,
    })
  }

  pub fn into_face(self, markers: Option<Vec<Marker>>) -> Result<Face> {
    Ok(Face {
      id: self.face_id,
      face_src: self.face_src,
      hidden: self.face_hidden,
      subj_uid: self.subj_uid,
      samples: self.samples,
      sample_radius: self.sample_radius,
      collisions: self.collisions,
      collision_radius: self.collision_radius,
      matched_at: self.matched_at.as_deref().map(decode_dt).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      markers,
    })
  }
}

/// Column list matching [`marker_from_row`].
pub const MARKER_COLUMNS: &str =
  "marker_uid, file_uid, subj_uid, x, y, w, h, score, marker_invalid";

/// Markers hold no encoded columns, so they are decoded in one step.
pub fn marker_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Marker> {
  Ok(Marker {
    uid:      row.get(0)?,
    file_uid: row.get(1)?,
    subj_uid: row.get(2)?,
    x:        row.get(3)?,
    y:        row.get(4)?,
    w:        row.get(5)?,
    h:        row.get(6)?,
    score:    row.get(7)?,
    invalid:  row.get(8)?,
  })
}

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub user_uid:      String,
  pub permissions:   String,
  pub preview_token: Option<String>,
  pub expires_at:    Option<String>,
}

impl RawSession {
  pub fn into_session(self) -> Result<mien_core::acl::Session> {
    Ok(mien_core::acl::Session {
      user_uid:      self.user_uid,
      permissions:   decode_permissions(&self.permissions)?,
      preview_token: self.preview_token,
      expires_at:    self.expires_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_hash_is_hex_sha256() {
    let h = hash_token("secret");
    assert_eq!(h.len(), 64);
    assert_eq!(h, hash_token("secret"));
    assert_ne!(h, hash_token("Secret"));
  }

  #[test]
  fn permissions_round_trip_as_strings() {
    let perms: Vec<Permission> =
      vec!["faces:read".parse().unwrap(), "faces:*".parse().unwrap()];
    let s = encode_permissions(&perms).unwrap();
    assert_eq!(s, r#"["faces:read","faces:*"]"#);
    assert_eq!(decode_permissions(&s).unwrap(), perms);
  }

  #[test]
  fn bad_timestamp_is_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
