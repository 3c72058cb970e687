//! Handlers for `/profiles` and `/companies` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/profiles` | Open registration; returns the API token once |
//! | `GET`  | `/profiles/me` | |
//! | `GET`  | `/profiles` | Administrators only |
//! | `PUT`  | `/profiles/{id}/company` | Administrators only |
//! | `PUT`  | `/profiles/{id}/authority` | BOSS only |
//! | `GET`  | `/companies` | |
//! | `POST` | `/companies` | Administrators only |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use roster_core::{
  person::{Authority, Company, NewProfile, Profile},
  store::ScheduleStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  auth::Actor,
  error::ApiError,
  extract::{Body, Path},
};

// ─── Profiles ─────────────────────────────────────────────────────────────────

/// `POST /profiles`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Body(body): Body<NewProfile>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  let registration = store.register_profile(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /profiles/me`
pub async fn me(actor: Actor) -> Json<Profile> { Json(actor.0) }

/// `GET /profiles`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require_administrator()?;
  let profiles = store.list_profiles().await.map_err(ApiError::from_store)?;
  Ok(Json(profiles))
}

#[derive(Debug, Deserialize)]
pub struct CompanyBody {
  pub company_id: Uuid,
}

/// `PUT /profiles/{id}/company`
pub async fn set_company<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(body): Body<CompanyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require_administrator()?;
  let profile = store
    .set_company(id, body.company_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::ACCEPTED, Json(profile)))
}

#[derive(Debug, Deserialize)]
pub struct AuthorityBody {
  pub authority: Authority,
}

/// `PUT /profiles/{id}/authority`
pub async fn set_authority<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Body(body): Body<AuthorityBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require(Authority::Boss)?;
  let profile = store
    .set_authority(id, body.authority)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::ACCEPTED, Json(profile)))
}

// ─── Companies ────────────────────────────────────────────────────────────────

/// `GET /companies`
pub async fn companies<S>(
  State(store): State<Arc<S>>,
  _actor: Actor,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let companies = store.list_companies().await.map_err(ApiError::from_store)?;
  Ok(Json(companies))
}

#[derive(Debug, Deserialize)]
pub struct NewCompanyBody {
  pub name: String,
}

/// `POST /companies`
pub async fn create_company<S>(
  State(store): State<Arc<S>>,
  actor: Actor,
  Body(body): Body<NewCompanyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  actor.require_administrator()?;
  let company = store.create_company(body.name).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(company)))
}
