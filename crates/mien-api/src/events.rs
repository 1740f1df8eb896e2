//! In-process notification bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the [`NotificationSink`] handlers publish to. Consumers
//! (log writers, websocket fan-out) subscribe independently; a slow or absent
//! consumer never affects the publishing request.

use mien_core::notify::{Notification, NotificationSink};
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

pub struct EventBus {
  sender: broadcast::Sender<Notification>,
}

impl EventBus {
  /// When the buffer is full the oldest messages are dropped and slow
  /// receivers observe `RecvError::Lagged`.
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
    self.sender.subscribe()
  }
}

impl Default for EventBus {
  fn default() -> Self { Self::new(DEFAULT_CAPACITY) }
}

impl NotificationSink for EventBus {
  fn notify(&self, notification: Notification) {
    // A send error only means there are no receivers.
    if self.sender.send(notification).is_err() {
      tracing::trace!("notification dropped: no subscribers");
    }
  }
}
