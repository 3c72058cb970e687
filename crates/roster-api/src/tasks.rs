//! Handlers for `/tasks` and `/estimations` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tasks` | Tasks the caller assigned or executes |
//! | `POST`   | `/tasks` | Body: `{"name","assigned_to","deadline"}`; MANAGER or higher |
//! | `GET`    | `/tasks/{id}` | Assignor or executor; 404 if not found |
//! | `PATCH`  | `/tasks/{id}` | Any of `name`, `assigned_to`, `deadline`; assignor only |
//! | `DELETE` | `/tasks/{id}` | Assignor only |
//! | `GET`    | `/tasks/{id}/status` | Assignor or executor |
//! | `POST`   | `/tasks/{id}/status` | Body: `{"status","comment"}`; executor only |
//! | `POST`   | `/tasks/{id}/estimation` | Three marks 1–10; assignor only, once |
//! | `GET`    | `/estimations` | Evaluations of the caller's own work |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use roster_core::{
  Entity,
  person::Authority,
  store::ScheduleStore,
  task::{EstimationInput, NewTask, StatusUpdate, Task, TaskEstimation, TaskPatch, TaskStatus},
};
use uuid::Uuid;

use crate::{
  auth::Actor,
  error::ApiError,
  extract::{Body, Path},
  ok,
};

// ─── Tasks ────────────────────────────────────────────────────────────────────

/// `GET /tasks`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
) -> Result<Json<Vec<Task>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let tasks = store.list_tasks(actor.id()).await.map_err(ApiError::from_store)?;
  Ok(Json(tasks))
}

/// `POST /tasks`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Body(body): Body<NewTask>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require(Authority::Manager)?;
  let task = store.create_task(actor.id(), body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(task)))
}

/// The task `id`, provided the caller assigned or executes it.
async fn involved_task<S>(store: &S, actor: &Actor, id: Uuid) -> Result<Task, ApiError>
where
  S: ScheduleStore,
{
  let task = store
    .get_task(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| roster_core::Error::not_found(Entity::Task, id))?;
  if !task.involves(actor.id()) {
    return Err(ApiError::forbidden(format!("task {id} is neither assigned by nor to you")));
  }
  Ok(task)
}

/// `GET /tasks/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let task = involved_task(store.as_ref(), &actor, id).await?;
  Ok(Json(task))
}

/// `PATCH /tasks/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(patch): Body<TaskPatch>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  let task = store.update_task(actor.id(), id, patch).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::ACCEPTED, Json(task)))
}

/// `DELETE /tasks/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  store.delete_task(actor.id(), id).await.map_err(ApiError::from_store)?;
  Ok(ok(format!("task {id} deleted")))
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /tasks/{id}/status`
pub async fn status<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<TaskStatus>, ApiError>
where
  S: ScheduleStore + 'static,
{
  involved_task(store.as_ref(), &actor, id).await?;
  let status = store
    .task_status(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| roster_core::Error::not_found(Entity::Task, id))?;
  Ok(Json(status))
}

/// `POST /tasks/{id}/status`
pub async fn update_status<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(update): Body<StatusUpdate>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  let status = store
    .update_task_status(actor.id(), id, update)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::ACCEPTED, Json(status)))
}

// ─── Estimations ──────────────────────────────────────────────────────────────

/// `POST /tasks/{id}/estimation`
pub async fn estimate<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(input): Body<EstimationInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  let marks = input.validate()?;
  let estimation = store
    .estimate_task(actor.id(), id, marks)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::ACCEPTED, Json(estimation)))
}

/// `GET /estimations`
pub async fn estimations<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
) -> Result<Json<Vec<TaskEstimation>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let estimations = store.list_estimations(actor.id()).await.map_err(ApiError::from_store)?;
  Ok(Json(estimations))
}
