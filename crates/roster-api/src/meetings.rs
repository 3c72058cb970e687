//! Handlers for `/meetings` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/meetings` | Meetings the caller organizes or attends |
//! | `POST`   | `/meetings` | Body: `{"start_at":..,"end_at":..}`; MANAGER or higher |
//! | `GET`    | `/meetings/{id}` | Attendees only; 404 if not found |
//! | `DELETE` | `/meetings/{id}` | Organizer only |
//! | `POST`   | `/meetings/{id}/participants` | Body: `{"name":"egor"}`; organizer only |
//! | `DELETE` | `/meetings/{id}/participants/{name}` | Organizer only |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use roster_core::{
  Entity,
  calendar::TimeWindow,
  meeting::Meeting,
  person::Authority,
  store::ScheduleStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  auth::Actor,
  error::ApiError,
  extract::{Body, Path},
  ok,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /meetings`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
) -> Result<Json<Vec<Meeting>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let meetings = store.list_meetings(actor.id()).await.map_err(ApiError::from_store)?;
  Ok(Json(meetings))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub start_at: DateTime<Utc>,
  pub end_at:   DateTime<Utc>,
}

/// `POST /meetings`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Body(body): Body<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require(Authority::Manager)?;
  let window = TimeWindow::new(body.start_at, body.end_at)?;
  let meeting = store
    .create_meeting(actor.id(), window)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(meeting)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /meetings/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Meeting>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let meeting = store
    .get_meeting(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| roster_core::Error::not_found(Entity::Meeting, id))?;
  if !meeting.is_attendee(actor.id()) {
    return Err(ApiError::forbidden(format!("not an attendee of meeting {id}")));
  }
  Ok(Json(meeting))
}

// ─── Cancel ───────────────────────────────────────────────────────────────────

/// `DELETE /meetings/{id}`
pub async fn cancel<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  store.cancel_meeting(actor.id(), id).await.map_err(ApiError::from_store)?;
  Ok(ok(format!("meeting {id} cancelled")))
}

// ─── Participants ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParticipantBody {
  pub name: String,
}

/// `POST /meetings/{id}/participants`
pub async fn add_participant<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(body): Body<ParticipantBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  let meeting = store
    .add_participant(actor.id(), id, body.name.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({
    "status":  "ok",
    "message": format!("{} added to meeting {id}", body.name),
    "meeting": meeting,
  })))
}

/// `DELETE /meetings/{id}/participants/{name}`
pub async fn remove_participant<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path((id, name)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  store
    .remove_participant(actor.id(), id, name.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok(ok(format!("{name} removed from meeting {id}")))
}
