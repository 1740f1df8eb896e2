//! Handlers for `/faces` endpoints.
//!
//! | Method | Path | Permission | Notes |
//! |--------|------|------------|-------|
//! | `GET`  | `/faces` | `faces:search` | Query: `id`, `subject`, `unknown`, `hidden`, `markers`, `count`, `offset` |
//! | `GET`  | `/faces/{id}` | `faces:read` | Markers always included; 404 if not found |
//! | `PUT`  | `/faces/{id}` | `faces:update` | Body: `{"SubjUID":"..."}` |
//!
//! Each handler runs the access check first, then decodes its input, then
//! calls the backend.

use axum::{
  Json,
  body::Body,
  extract::{Path, State},
  http::{HeaderMap, Uri},
  response::Response,
};
use mien_core::{
  acl::{Action, Resource},
  face::{Face, FaceSearchQuery},
  notify::{Notification, NotificationSink},
  store::{FaceStore, SessionResolver},
};

use crate::{
  AppState, decode,
  error::ApiError,
  guard::{authorize, session_token},
  respond,
};

/// Notification sent after a face was relinked.
pub const MSG_PERSON_SAVED: &str = "Person saved";

/// Largest update body read after the access check.
pub const MAX_UPDATE_BODY: usize = 64 * 1024;

// ─── Search ───────────────────────────────────────────────────────────────────

/// `GET /faces[?id=...][&subject=...][&unknown=true][&hidden=true][&markers=true][&count=...][&offset=...]`
pub async fn search<S, A>(
  State(state): State<AppState<S, A>>,
  headers: HeaderMap,
  uri: Uri,
) -> Result<Response, ApiError>
where
  S: FaceStore,
  A: SessionResolver,
{
  let subject = authorize(
    state.sessions.as_ref(),
    session_token(&headers),
    Resource::Faces,
    Action::Search,
  )
  .await?;

  let query = decode::search_query(&uri)?;

  let results = state.store.search_faces(&query).await.map_err(|e| {
    tracing::warn!(error = %e, "face search failed");
    ApiError::search(e)
  })?;

  tracing::debug!(
    user_uid = %subject.user_uid,
    count = results.faces.len(),
    "face search"
  );
  Ok(respond::search(results, &query, &subject))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /faces/{id}`
///
/// A search failure is reported as not found, like an empty result.
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Json<Face>, ApiError>
where
  S: FaceStore,
  A: SessionResolver,
{
  authorize(
    state.sessions.as_ref(),
    session_token(&headers),
    Resource::Faces,
    Action::Read,
  )
  .await?;

  let query = FaceSearchQuery::by_id(id);

  let results = state.store.search_faces(&query).await.map_err(|e| {
    tracing::warn!(error = %e, face_id = ?query.id, "face lookup failed");
    ApiError::NotFound
  })?;

  results
    .faces
    .into_iter()
    .next()
    .map(Json)
    .ok_or(ApiError::NotFound)
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /faces/{id}`. Body: `{"SubjUID":"..."}`; returns the updated face.
pub async fn update<S, A>(
  State(state): State<AppState<S, A>>,
  headers: HeaderMap,
  Path(id): Path<String>,
  body: Body,
) -> Result<Json<Face>, ApiError>
where
  S: FaceStore,
  A: SessionResolver,
{
  let subject = authorize(
    state.sessions.as_ref(),
    session_token(&headers),
    Resource::Faces,
    Action::Update,
  )
  .await?;

  let body = axum::body::to_bytes(body, MAX_UPDATE_BODY).await.map_err(|e| {
    tracing::debug!(error = %e, "rejecting face update body");
    ApiError::BadRequest
  })?;
  let update = decode::face_update(id, &body)?;

  let face = state
    .store
    .find_face(&update.face_id)
    .await
    .map_err(|e| {
      tracing::warn!(error = %e, face_id = %update.face_id, "face lookup failed");
      ApiError::update(e)
    })?
    .ok_or(ApiError::NotFound)?;

  let saved = state
    .store
    .set_subject(face, update.subj_uid)
    .await
    .map_err(|e| {
      tracing::warn!(error = %e, face_id = %update.face_id, "face update failed");
      ApiError::update(e)
    })?;

  state
    .notifier
    .notify(Notification::success(MSG_PERSON_SAVED).with_source("face", saved.id.clone()));

  tracing::debug!(
    user_uid = %subject.user_uid,
    face_id = %saved.id,
    subj_uid = ?saved.subj_uid,
    "face updated"
  );
  Ok(Json(saved))
}
