//! Process wiring for the Mien face API.
//!
//! Loads [`ServerConfig`], mounts [`mien_api::api_router`] under `/api/v1`
//! with request tracing, and logs notifications published on the
//! [`EventBus`](mien_api::EventBus).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use mien_api::AppState;
use mien_core::{
  notify::Notification,
  store::{FaceStore, SessionResolver},
};
use serde::Deserialize;
use tokio::{sync::broadcast, task::JoinHandle};
use tower_http::trace::TraceLayer;

/// Prefix under which the API is served.
pub const API_PREFIX: &str = "/api/v1";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MIEN_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

/// Read `path` (optional) layered under `MIEN_`-prefixed environment
/// variables, on top of built-in defaults.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 2342_i64)?
    .set_default("store_path", "mien.db")?
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("MIEN"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The complete HTTP application.
pub fn app<S, A>(state: AppState<S, A>) -> Router
where
  S: FaceStore + 'static,
  A: SessionResolver + 'static,
{
  Router::new()
    .nest(API_PREFIX, mien_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Log every notification until the bus is dropped.
pub fn spawn_event_log(mut rx: broadcast::Receiver<Notification>) -> JoinHandle<()> {
  tokio::spawn(async move {
    loop {
      match rx.recv().await {
        Ok(n) => tracing::info!(
          level = ?n.level,
          entity_type = n.entity_type.as_deref(),
          entity_id = n.entity_id.as_deref(),
          "{}",
          n.message
        ),
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "event log fell behind");
        }
        Err(broadcast::error::RecvError::Closed) => break,
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use mien_api::EventBus;
  use mien_core::{
    acl::Session,
    face::Face,
    notify::NotificationSink,
  };
  use mien_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn missing_config_file_uses_defaults() {
    let cfg = load_config(Path::new("/nonexistent/mien.toml")).unwrap();
    assert_eq!(cfg.port, 2342);
    assert_eq!(cfg.store_path, PathBuf::from("mien.db"));
  }

  #[test]
  fn config_file_overrides_defaults() {
    let path = std::env::temp_dir().join(format!("mien-test-{}.toml", std::process::id()));
    std::fs::write(&path, "port = 8080\nstore_path = \"/var/lib/mien/faces.db\"\n").unwrap();
    let cfg = load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/mien/faces.db"));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let now = chrono::Utc::now();
    store
      .insert_face(&Face {
        id:               "abc123".into(),
        face_src:         "auto".into(),
        hidden:           false,
        subj_uid:         None,
        samples:          1,
        sample_radius:    0.0,
        collisions:       0,
        collision_radius: 0.0,
        matched_at:       None,
        created_at:       now,
        updated_at:       now,
        markers:          None,
      })
      .await
      .unwrap();
    store
      .insert_session("tok", &Session {
        user_uid:      "u1".into(),
        permissions:   vec!["faces:read".parse().unwrap()],
        expires_at:    None,
        preview_token: None,
      })
      .await
      .unwrap();

    let state = AppState {
      store:    store.clone(),
      sessions: store,
      notifier: Arc::new(EventBus::default()),
    };
    let router = app(state);

    let req = Request::builder()
      .uri("/api/v1/faces/abc123")
      .header("x-session-id", "tok")
      .body(Body::empty())
      .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
      .uri("/faces/abc123")
      .header("x-session-id", "tok")
      .body(Body::empty())
      .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn event_log_stops_when_bus_is_dropped() {
    let bus = EventBus::default();
    let handle = spawn_event_log(bus.subscribe());
    bus.notify(Notification::success("Person saved"));
    drop(bus);
    handle.await.unwrap();
  }
}
