//! HTTP server assembly for Roster.
//!
//! Mounts the JSON API from `roster-api` under `/api/v1`, wraps it in a
//! request-tracing layer, and defines the runtime configuration the binary
//! loads.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use roster_core::store::ScheduleStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8000,
      store_path: PathBuf::from("roster.db"),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ScheduleStore + 'static,
{
  Router::new()
    .nest("/api/v1", roster_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
