//! Handlers for `/calendar` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/calendar` | Required `?period=daily\|monthly`, relative to the store's clock |
//! | `GET`  | `/calendar/availability` | `?start_at=..&end_at=..`; meetings only |

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use roster_core::{
  calendar::{CalendarEntry, Period, TimeWindow},
  store::ScheduleStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{auth::Actor, error::ApiError, extract::Query};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub period: Option<String>,
}

/// `GET /calendar?period=<period>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CalendarEntry>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let period = params
    .period
    .ok_or_else(|| ApiError::BadRequest("missing query parameter `period`".into()))?;
  let period: Period = period.parse().map_err(|_| {
    ApiError::BadRequest(format!("unknown period {period:?}; expected daily or monthly"))
  })?;

  let window = period.window_containing(store.now());
  let entries = store
    .calendar(actor.id(), Some(window))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
  pub start_at: DateTime<Utc>,
  pub end_at:   DateTime<Utc>,
}

/// `GET /calendar/availability?start_at=..&end_at=..`
pub async fn availability<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Query(params): Query<AvailabilityParams>,
) -> Result<Json<Value>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let window = TimeWindow::new(params.start_at, params.end_at)?;
  let free = store.is_free(actor.id(), window).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "free": free, "start_at": window.start, "end_at": window.end })))
}
