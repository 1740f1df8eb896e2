//! Error types for `mien-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("face not found: {0}")]
  FaceNotFound(String),

  #[error("invalid permission {0:?}, expected `resource:action`")]
  InvalidPermission(String),

  #[error("unknown resource: {0:?}")]
  UnknownResource(String),

  #[error("unknown action: {0:?}")]
  UnknownAction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
