//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
///
/// Every variant maps to exactly one status code. Backend messages are
/// displayable: they reach the client capitalised, not hidden.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, unknown or expired session, or a missing permission.
  #[error("unauthorized")]
  Unauthorized,

  /// Query string or body could not be bound.
  #[error("bad request")]
  BadRequest,

  #[error("face not found")]
  NotFound,

  #[error("search failed: {0}")]
  Search(#[source] BoxError),

  #[error("update failed: {0}")]
  Update(#[source] BoxError),
}

impl ApiError {
  pub fn search(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Search(Box::new(e))
  }

  pub fn update(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Update(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest | ApiError::Search(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Update(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// The text placed in the `error` field of the response body.
  pub fn message(&self) -> String {
    match self {
      ApiError::Unauthorized => "Unauthorized".to_owned(),
      ApiError::BadRequest => "Bad request".to_owned(),
      ApiError::NotFound => "Face not found".to_owned(),
      ApiError::Search(e) | ApiError::Update(e) => uc_first(&e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "error": self.message() }))).into_response()
  }
}

/// Upper-case the first character of `s`.
pub fn uc_first(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uc_first_handles_edges() {
    assert_eq!(uc_first("database error: locked"), "Database error: locked");
    assert_eq!(uc_first("Already"), "Already");
    assert_eq!(uc_first(""), "");
    assert_eq!(uc_first("ébauche"), "Ébauche");
  }

  #[test]
  fn backend_messages_pass_through() {
    let e = ApiError::update(std::io::Error::other("foreign key constraint failed"));
    assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(e.message(), "Foreign key constraint failed");
  }
}
