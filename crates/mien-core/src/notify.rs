//! User-facing notifications emitted after successful writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Success,
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub level:       Level,
  pub message:     String,
  /// Entity kind the notification is about, e.g. `"face"`.
  pub entity_type: Option<String>,
  pub entity_id:   Option<String>,
  pub timestamp:   DateTime<Utc>,
}

impl Notification {
  pub fn new(level: Level, message: impl Into<String>) -> Self {
    Self {
      level,
      message: message.into(),
      entity_type: None,
      entity_id: None,
      timestamp: Utc::now(),
    }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(Level::Success, message)
  }

  /// Attach the entity the notification refers to.
  pub fn with_source(
    mut self,
    entity_type: impl Into<String>,
    entity_id: impl Into<String>,
  ) -> Self {
    self.entity_type = Some(entity_type.into());
    self.entity_id = Some(entity_id.into());
    self
  }
}

/// Fire-and-forget notification channel.
///
/// `notify` cannot fail: implementations drop undeliverable messages.
pub trait NotificationSink: Send + Sync {
  fn notify(&self, notification: Notification);
}
