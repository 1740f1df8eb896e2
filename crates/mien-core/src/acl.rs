//! Access control types: resources, actions, permissions, and sessions.
//!
//! A permission is a `(resource, action)` pair written as `resource:action`,
//! e.g. `faces:update`. The wildcard action `*` grants every action on its
//! resource.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::Error;

// ─── Resources and actions ───────────────────────────────────────────────────

/// A named class of protected operations.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Resource {
  Faces,
}

/// An operation performed on a [`Resource`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Search,
  Read,
  Update,
  /// Grants every action on the resource.
  #[strum(serialize = "*")]
  #[serde(rename = "*")]
  All,
}

// ─── Permission ──────────────────────────────────────────────────────────────

/// A single grant held by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission {
  pub resource: Resource,
  pub action:   Action,
}

impl Permission {
  pub fn new(resource: Resource, action: Action) -> Self {
    Self { resource, action }
  }

  /// Whether this grant covers `action` on `resource`.
  pub fn grants(&self, resource: Resource, action: Action) -> bool {
    self.resource == resource
      && (self.action == Action::All || self.action == action)
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.resource, self.action)
  }
}

impl FromStr for Permission {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (resource, action) = s
      .split_once(':')
      .ok_or_else(|| Error::InvalidPermission(s.to_owned()))?;
    let resource = resource
      .parse()
      .map_err(|_| Error::UnknownResource(resource.to_owned()))?;
    let action = action
      .parse()
      .map_err(|_| Error::UnknownAction(action.to_owned()))?;
    Ok(Self { resource, action })
  }
}

impl TryFrom<String> for Permission {
  type Error = Error;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Permission> for String {
  fn from(p: Permission) -> Self { p.to_string() }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// A caller's session as reported by a [`SessionResolver`](crate::store::SessionResolver).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  /// Identifier of the user the session belongs to.
  pub user_uid:      String,
  pub permissions:   Vec<Permission>,
  /// `None` means the session never expires.
  pub expires_at:    Option<DateTime<Utc>>,
  /// Short-lived token for thumbnail and preview URLs, echoed to clients.
  pub preview_token: Option<String>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at <= now)
  }

  pub fn allows(&self, resource: Resource, action: Action) -> bool {
    self.permissions.iter().any(|p| p.grants(resource, action))
  }
}

/// Proof that a caller passed the access check for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedSubject {
  pub user_uid:      String,
  pub preview_token: Option<String>,
}

impl From<Session> for AuthorizedSubject {
  fn from(s: Session) -> Self {
    Self { user_uid: s.user_uid, preview_token: s.preview_token }
  }
}
