//! Shaping of successful search results into responses with paging metadata.

use axum::{
  Json,
  http::{HeaderMap, HeaderName, HeaderValue},
  response::{IntoResponse, Response},
};
use mien_core::{
  acl::AuthorizedSubject,
  face::FaceSearchQuery,
  store::FaceResults,
};

pub const X_COUNT: HeaderName = HeaderName::from_static("x-count");
pub const X_TOTAL: HeaderName = HeaderName::from_static("x-total");
pub const X_LIMIT: HeaderName = HeaderName::from_static("x-limit");
pub const X_OFFSET: HeaderName = HeaderName::from_static("x-offset");
pub const X_PREVIEW_TOKEN: HeaderName = HeaderName::from_static("x-preview-token");

/// Paging metadata for a search response.
///
/// `X-Limit` and `X-Offset` echo the query as given; `X-Count` is the number
/// of faces in this page.
pub fn search_headers(
  results: &FaceResults,
  query: &FaceSearchQuery,
  subject: &AuthorizedSubject,
) -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(X_COUNT, HeaderValue::from(results.faces.len()));
  headers.insert(X_TOTAL, HeaderValue::from(results.total));
  headers.insert(X_LIMIT, HeaderValue::from(query.count));
  headers.insert(X_OFFSET, HeaderValue::from(query.offset));

  if let Some(token) = &subject.preview_token {
    match HeaderValue::from_str(token) {
      Ok(v) => {
        headers.insert(X_PREVIEW_TOKEN, v);
      }
      Err(_) => tracing::warn!(user_uid = %subject.user_uid, "preview token is not a valid header value"),
    }
  }

  headers
}

/// The full search response: faces in backend order plus metadata headers.
pub fn search(
  results: FaceResults,
  query: &FaceSearchQuery,
  subject: &AuthorizedSubject,
) -> Response {
  let headers = search_headers(&results, query, subject);
  (headers, Json(results.faces)).into_response()
}
