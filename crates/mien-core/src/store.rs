//! Collaborator traits consumed by the API layer.
//!
//! The traits are implemented by storage backends (e.g. `mien-store-sqlite`).
//! `mien-api` depends on these abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  acl::Session,
  face::{Face, FaceSearchQuery},
};

/// An ordered page of search results.
#[derive(Debug, Clone, Default)]
pub struct FaceResults {
  /// In backend order; callers must not re-sort.
  pub faces: Vec<Face>,
  /// Number of faces matching the filters before pagination.
  pub total: usize,
}

/// Abstraction over the face index and face repository.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait FaceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Index ─────────────────────────────────────────────────────────────

  /// Run a filtered, paginated search. `query.count` and `query.offset` are
  /// applied as given.
  fn search_faces<'a>(
    &'a self,
    query: &'a FaceSearchQuery,
  ) -> impl Future<Output = Result<FaceResults, Self::Error>> + Send + 'a;

  // ── Repository ────────────────────────────────────────────────────────

  /// Retrieve a face by identifier. Returns `None` if not found.
  fn find_face<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Face>, Self::Error>> + Send + 'a;

  /// Relink `face` to `subj_uid` (or unlink it when `None`) and commit.
  ///
  /// The change is atomic: on error the stored face is left as it was. The
  /// face identifier is never changed. Returns the face as stored.
  fn set_subject(
    &self,
    face: Face,
    subj_uid: Option<String>,
  ) -> impl Future<Output = Result<Face, Self::Error>> + Send + '_;
}

/// Resolves an opaque session token to a [`Session`].
pub trait SessionResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Returns `None` for unknown tokens. Expiry is checked by the caller.
  fn resolve<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;
}
