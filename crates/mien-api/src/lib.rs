//! JSON REST API for faces.
//!
//! Exposes an axum [`Router`] backed by any [`FaceStore`] and
//! [`SessionResolver`]. TLS and process wiring are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", mien_api::api_router(state))
//! ```

pub mod decode;
pub mod error;
pub mod events;
pub mod faces;
pub mod guard;
pub mod respond;

use std::sync::Arc;

use axum::{Router, routing::get};
use mien_core::{
  notify::NotificationSink,
  store::{FaceStore, SessionResolver},
};

pub use error::ApiError;
pub use events::EventBus;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Every field is immutable.
pub struct AppState<S, A> {
  pub store:    Arc<S>,
  pub sessions: Arc<A>,
  pub notifier: Arc<dyn NotificationSink>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      sessions: Arc::clone(&self.sessions),
      notifier: Arc::clone(&self.notifier),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: AppState<S, A>) -> Router<()>
where
  S: FaceStore + 'static,
  A: SessionResolver + 'static,
{
  Router::new()
    .route("/faces", get(faces::search::<S, A>))
    .route(
      "/faces/{id}",
      get(faces::get_one::<S, A>).put(faces::update::<S, A>),
    )
    .with_state(state)
}
