//! SQL schema for the Mien SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subj_uid    TEXT PRIMARY KEY,
    subj_name   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Rows are written by the detection pipeline. The API only ever updates
-- subj_uid and updated_at.
CREATE TABLE IF NOT EXISTS faces (
    face_id          TEXT PRIMARY KEY,
    face_src         TEXT NOT NULL DEFAULT 'auto',
    face_hidden      INTEGER NOT NULL DEFAULT 0,
    subj_uid         TEXT REFERENCES subjects(subj_uid),
    samples          INTEGER NOT NULL DEFAULT 0,
    sample_radius    REAL NOT NULL DEFAULT 0,
    collisions       INTEGER NOT NULL DEFAULT 0,
    collision_radius REAL NOT NULL DEFAULT 0,
    matched_at       TEXT,             -- ISO 8601 UTC or NULL
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS markers (
    marker_uid     TEXT PRIMARY KEY,
    file_uid       TEXT NOT NULL,
    face_id        TEXT REFERENCES faces(face_id),
    subj_uid       TEXT REFERENCES subjects(subj_uid),
    x              REAL NOT NULL,
    y              REAL NOT NULL,
    w              REAL NOT NULL,
    h              REAL NOT NULL,
    score          INTEGER NOT NULL DEFAULT 0,
    marker_invalid INTEGER NOT NULL DEFAULT 0
);

-- Tokens are never stored in clear; token_hash is the hex SHA-256 digest.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash    TEXT PRIMARY KEY,
    user_uid      TEXT NOT NULL,
    permissions   TEXT NOT NULL DEFAULT '[]',  -- JSON array of `resource:action`
    preview_token TEXT,
    expires_at    TEXT
);

CREATE INDEX IF NOT EXISTS faces_subject_idx  ON faces(subj_uid);
CREATE INDEX IF NOT EXISTS faces_samples_idx  ON faces(samples);
CREATE INDEX IF NOT EXISTS markers_face_idx   ON markers(face_id);

PRAGMA user_version = 1;
";
