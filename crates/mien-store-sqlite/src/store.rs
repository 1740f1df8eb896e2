//! The SQLite implementation of [`FaceStore`] and
//! [`SessionResolver`]: [`SqliteStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use mien_core::{
  acl::Session,
  face::{Face, FaceSearchQuery, Marker},
  store::{FaceResults, FaceStore, SessionResolver},
};

use crate::{
  Error, Result,
  encode::{
    FACE_COLUMNS, MARKER_COLUMNS, RawFace, RawSession, encode_dt,
    encode_permissions, hash_token, marker_from_row,
  },
  schema::SCHEMA,
};

/// Upper bound on a single search page. A `count` of `0` also means this.
pub const MAX_RESULTS: usize = 1000;

/// Shared filter clause for search and count queries.
///
/// ?1 id, ?2 subject, ?3 unknown-only, ?4 include hidden. An id filter also
/// matches hidden faces.
const SEARCH_WHERE: &str = "WHERE (?1 IS NULL OR f.face_id = ?1)
     AND (?2 IS NULL OR f.subj_uid = ?2)
     AND (?3 = 0 OR f.subj_uid IS NULL)
     AND (?4 = 1 OR ?1 IS NOT NULL OR f.face_hidden = 0)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Mien face store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Seeding ───────────────────────────────────────────────────────────────
  //
  // Subjects, faces, markers and sessions are owned by other subsystems
  // (people management, detection, auth). These writers exist for them and
  // for fixtures; the API never calls them.

  pub async fn insert_subject(&self, subj_uid: &str, name: &str) -> Result<()> {
    let uid    = subj_uid.to_owned();
    let name   = name.to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subj_uid, subj_name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![uid, name, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a face row. `face.markers` is ignored; use [`Self::insert_marker`].
  pub async fn insert_face(&self, face: &Face) -> Result<()> {
    let f              = face.clone();
    let matched_at_str = f.matched_at.map(encode_dt);
    let created_at_str = encode_dt(f.created_at);
    let updated_at_str = encode_dt(f.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO faces (
             face_id, face_src, face_hidden, subj_uid,
             samples, sample_radius, collisions, collision_radius,
             matched_at, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            f.id,
            f.face_src,
            f.hidden,
            f.subj_uid,
            f.samples,
            f.sample_radius,
            f.collisions,
            f.collision_radius,
            matched_at_str,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_marker(&self, face_id: &str, marker: &Marker) -> Result<()> {
    let face_id = face_id.to_owned();
    let m       = marker.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO markers (
             marker_uid, file_uid, face_id, subj_uid,
             x, y, w, h, score, marker_invalid
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            m.uid, m.file_uid, face_id, m.subj_uid, m.x, m.y, m.w, m.h,
            m.score, m.invalid,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Store `session` under the digest of `token`, replacing any previous one.
  pub async fn insert_session(&self, token: &str, session: &Session) -> Result<()> {
    let hash           = hash_token(token);
    let user_uid       = session.user_uid.clone();
    let perms_str      = encode_permissions(&session.permissions)?;
    let preview_token  = session.preview_token.clone();
    let expires_at_str = session.expires_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO sessions
             (token_hash, user_uid, permissions, preview_token, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![hash, user_uid, perms_str, preview_token, expires_at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn effective_limit(count: usize) -> usize {
  if count == 0 { MAX_RESULTS } else { count.min(MAX_RESULTS) }
}

/// Load the markers of one face in a stable order.
fn load_markers(conn: &rusqlite::Connection, face_id: &str) -> rusqlite::Result<Vec<Marker>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {MARKER_COLUMNS} FROM markers WHERE face_id = ?1 ORDER BY marker_uid"
  ))?;
  stmt
    .query_map(rusqlite::params![face_id], marker_from_row)?
    .collect()
}

// ─── FaceStore impl ──────────────────────────────────────────────────────────

impl FaceStore for SqliteStore {
  type Error = Error;

  async fn search_faces(&self, query: &FaceSearchQuery) -> Result<FaceResults> {
    let id          = query.id.clone();
    let subject     = query.subject.clone();
    let unknown     = query.unknown;
    let hidden      = query.hidden;
    let markers     = query.markers;
    let limit_val   = effective_limit(query.count) as i64;
    // Past i64::MAX nothing can match; clamp so the page is empty.
    let offset_val  = i64::try_from(query.offset).unwrap_or(i64::MAX);

    let (raws, total): (Vec<(RawFace, Option<Vec<Marker>>)>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM faces f {SEARCH_WHERE}"),
          rusqlite::params![id, subject, unknown, hidden],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {FACE_COLUMNS}
           FROM faces f
           {SEARCH_WHERE}
           ORDER BY f.samples DESC, f.face_id
           LIMIT ?5 OFFSET ?6"
        ))?;
        let faces = stmt
          .query_map(
            rusqlite::params![id, subject, unknown, hidden, limit_val, offset_val],
            RawFace::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(faces.len());
        for raw in faces {
          let m = if markers {
            Some(load_markers(conn, &raw.face_id)?)
          } else {
            None
          };
          rows.push((raw, m));
        }

        Ok((rows, total))
      })
      .await?;

    let faces = raws
      .into_iter()
      .map(|(raw, m)| raw.into_face(m))
      .collect::<Result<Vec<_>>>()?;

    Ok(FaceResults { faces, total: total as usize })
  }

  async fn find_face(&self, id: &str) -> Result<Option<Face>> {
    let id_str = id.to_owned();

    let raw: Option<RawFace> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FACE_COLUMNS} FROM faces f WHERE f.face_id = ?1"),
            rusqlite::params![id_str],
            RawFace::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(|r| r.into_face(None)).transpose()
  }

  async fn set_subject(&self, face: Face, subj_uid: Option<String>) -> Result<Face> {
    let face_id = face.id;
    let id_str  = face_id.clone();
    let at_str  = encode_dt(Utc::now());

    let raw: Option<RawFace> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE faces SET subj_uid = ?2, updated_at = ?3 WHERE face_id = ?1",
          rusqlite::params![id_str, subj_uid, at_str],
        )?;
        if changed == 0 {
          // Dropping `tx` rolls back.
          return Ok(None);
        }

        tx.execute(
          "UPDATE markers SET subj_uid = ?2 WHERE face_id = ?1",
          rusqlite::params![id_str, subj_uid],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {FACE_COLUMNS} FROM faces f WHERE f.face_id = ?1"),
          rusqlite::params![id_str],
          RawFace::from_row,
        )?;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    let raw = raw.ok_or_else(|| mien_core::Error::FaceNotFound(face_id.clone()))?;
    tracing::debug!(face_id = %face_id, subj_uid = ?raw.subj_uid, "face subject updated");
    raw.into_face(None)
  }
}

// ─── SessionResolver impl ────────────────────────────────────────────────────

impl SessionResolver for SqliteStore {
  type Error = Error;

  async fn resolve(&self, token: &str) -> Result<Option<Session>> {
    let hash = hash_token(token);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_uid, permissions, preview_token, expires_at
             FROM sessions WHERE token_hash = ?1",
            rusqlite::params![hash],
            |row| {
              Ok(RawSession {
                user_uid:      row.get(0)?,
                permissions:   row.get(1)?,
                preview_token: row.get(2)?,
                expires_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }
}
