//! The access check every face operation runs before anything else.

use axum::http::{HeaderMap, header};
use chrono::Utc;
use mien_core::{
  acl::{Action, AuthorizedSubject, Resource},
  store::SessionResolver,
};

use crate::error::ApiError;

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// Extract the session token from `X-Session-ID`, falling back to
/// `Authorization: Bearer <token>`.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(SESSION_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .or_else(|| {
      headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    })
}

/// Resolve `token` and check it grants `action` on `resource`.
///
/// Fails closed: a missing token, an unknown or expired session, a missing
/// permission and a resolver failure are all [`ApiError::Unauthorized`].
pub async fn authorize<A>(
  sessions: &A,
  token: Option<&str>,
  resource: Resource,
  action: Action,
) -> Result<AuthorizedSubject, ApiError>
where
  A: SessionResolver,
{
  let Some(token) = token else {
    tracing::debug!(%resource, %action, "request without session token");
    return Err(ApiError::Unauthorized);
  };

  let session = match sessions.resolve(token).await {
    Ok(Some(session)) => session,
    Ok(None) => {
      tracing::debug!(%resource, %action, "unknown session token");
      return Err(ApiError::Unauthorized);
    }
    Err(e) => {
      tracing::warn!(error = %e, "session lookup failed");
      return Err(ApiError::Unauthorized);
    }
  };

  if session.is_expired(Utc::now()) {
    tracing::debug!(user_uid = %session.user_uid, "session expired");
    return Err(ApiError::Unauthorized);
  }

  if !session.allows(resource, action) {
    tracing::warn!(
      user_uid = %session.user_uid,
      %resource,
      %action,
      "permission denied"
    );
    return Err(ApiError::Unauthorized);
  }

  Ok(session.into())
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn session_header_wins_over_bearer() {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer b-token"));
    assert_eq!(session_token(&h), Some("b-token"));

    h.insert(SESSION_HEADER, HeaderValue::from_static("s-token"));
    assert_eq!(session_token(&h), Some("s-token"));
  }

  #[test]
  fn blank_or_foreign_schemes_yield_none() {
    let mut h = HeaderMap::new();
    assert_eq!(session_token(&h), None);

    h.insert(SESSION_HEADER, HeaderValue::from_static("  "));
    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
    assert_eq!(session_token(&h), None);
  }
}
