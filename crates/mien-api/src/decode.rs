//! Binding of query strings and bodies into validated request types.
//!
//! Binding is all-or-nothing: any parameter that fails to parse rejects the
//! whole request with [`ApiError::BadRequest`]. An empty value binds as the
//! field's zero value.

use axum::{extract::Query, http::Uri};
use mien_core::face::{FaceSearchQuery, FaceUpdate};
use serde::{Deserialize, Deserializer, de};

use crate::error::ApiError;

/// Query parameters of `GET /faces`. Unknown parameters are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub id:      Option<String>,
  pub subject: Option<String>,
  /// Only faces that are not linked to a subject.
  #[serde(default, deserialize_with = "form_bool")]
  pub unknown: bool,
  #[serde(default, deserialize_with = "form_bool")]
  pub hidden:  bool,
  #[serde(default, deserialize_with = "form_bool")]
  pub markers: bool,
  #[serde(default, deserialize_with = "form_usize")]
  pub count:   usize,
  #[serde(default, deserialize_with = "form_usize")]
  pub offset:  usize,
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
fn form_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
  let s = String::deserialize(d)?;
  match s.as_str() {
    "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
    "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
    other => Err(de::Error::invalid_value(de::Unexpected::Str(other), &"a boolean")),
  }
}

fn form_usize<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
  let s = String::deserialize(d)?;
  if s.is_empty() {
    return Ok(0);
  }
  s.parse().map_err(de::Error::custom)
}

impl From<SearchParams> for FaceSearchQuery {
  fn from(p: SearchParams) -> Self {
    FaceSearchQuery {
      id:      p.id.filter(|s| !s.is_empty()),
      subject: p.subject.filter(|s| !s.is_empty()),
      unknown: p.unknown,
      hidden:  p.hidden,
      markers: p.markers,
      count:   p.count,
      offset:  p.offset,
    }
  }
}

/// Decode the query string of `uri` into a [`FaceSearchQuery`].
pub fn search_query(uri: &Uri) -> Result<FaceSearchQuery, ApiError> {
  let Query(params) = Query::<SearchParams>::try_from_uri(uri).map_err(|e| {
    tracing::debug!(error = %e, "rejecting search parameters");
    ApiError::BadRequest
  })?;
  Ok(params.into())
}

/// JSON body accepted by `PUT /faces/{id}`.
///
/// Other fields, including `ID`, are ignored: the face identifier comes from
/// the route.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(rename = "SubjUID", default)]
  pub subj_uid: Option<String>,
}

/// Decode an update body for the face addressed by `face_id`.
pub fn face_update(face_id: String, body: &[u8]) -> Result<FaceUpdate, ApiError> {
  let body: UpdateBody = serde_json::from_slice(body).map_err(|e| {
    tracing::debug!(error = %e, "rejecting face update body");
    ApiError::BadRequest
  })?;
  Ok(FaceUpdate::new(face_id, body.subj_uid))
}
