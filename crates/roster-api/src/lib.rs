//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::ScheduleStore`].
//! Every route except registration requires `Authorization: Token <key>`.
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", roster_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod calendar;
pub mod error;
pub mod extract;
pub mod meetings;
pub mod profiles;
pub mod tasks;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, post, put},
};
use roster_core::store::ScheduleStore;
use serde_json::{Value, json};

pub use auth::Actor;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScheduleStore + 'static,
{
  Router::new()
    // Meetings
    .route("/meetings", get(meetings::list::<S>).post(meetings::create::<S>))
    .route("/meetings/{id}", get(meetings::get_one::<S>).delete(meetings::cancel::<S>))
    .route("/meetings/{id}/participants", post(meetings::add_participant::<S>))
    .route("/meetings/{id}/participants/{name}", delete(meetings::remove_participant::<S>))
    // Calendar
    .route("/calendar", get(calendar::list::<S>))
    .route("/calendar/availability", get(calendar::availability::<S>))
    // Tasks
    .route("/tasks", get(tasks::list::<S>).post(tasks::create::<S>))
    .route(
      "/tasks/{id}",
      get(tasks::get_one::<S>).patch(tasks::update::<S>).delete(tasks::delete::<S>),
    )
    .route("/tasks/{id}/status", get(tasks::status::<S>).post(tasks::update_status::<S>))
    .route("/tasks/{id}/estimation", post(tasks::estimate::<S>))
    .route("/estimations", get(tasks::estimations::<S>))
    // Directory
    .route("/profiles", get(profiles::list::<S>).post(profiles::register::<S>))
    .route("/profiles/me", get(profiles::me))
    .route("/profiles/{id}/company", put(profiles::set_company::<S>))
    .route("/profiles/{id}/authority", put(profiles::set_authority::<S>))
    .route("/companies", get(profiles::companies::<S>).post(profiles::create_company::<S>))
    .with_state(store)
}

/// The `{"status":"ok","message":..}` body of a successful command.
pub(crate) fn ok(message: impl Into<String>) -> Json<Value> {
  Json(json!({ "status": "ok", "message": message.into() }))
}
