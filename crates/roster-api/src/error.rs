//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Business outcomes carry their machine-checkable `code` to the client.
//! Anything else is logged under a fresh correlation id and surfaces as a
//! bare 500 that only repeats the id.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use roster_core::DomainError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] roster_core::Error),

  #[error("authentication required")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: domain outcomes keep their meaning, the rest
  /// become opaque store failures.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    match e.domain() {
      Some(domain) => Self::Domain(domain.clone()),
      None => Self::Store(Box::new(e)),
    }
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    Self::Domain(roster_core::Error::Forbidden(message.into()))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Domain(roster_core::Error::Forbidden(_)) => StatusCode::FORBIDDEN,
      Self::Domain(roster_core::Error::NotFound { .. }) => StatusCode::NOT_FOUND,
      Self::Domain(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    match self {
      ApiError::Domain(e) => (
        status,
        Json(json!({ "status": "error", "code": e.code(), "message": e.to_string() })),
      )
        .into_response(),
      ApiError::Unauthorized => {
        let mut res = (
          status,
          Json(json!({
            "status":  "error",
            "code":    "unauthorized",
            "message": "authentication required",
          })),
        )
          .into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        res
      }
      ApiError::BadRequest(message) => (
        status,
        Json(json!({ "status": "error", "code": "bad_request", "message": message })),
      )
        .into_response(),
      ApiError::Store(e) => {
        let correlation_id = Uuid::new_v4();
        tracing::error!(correlation_id = %correlation_id, error = %e, "unexpected store failure");
        (
          status,
          Json(json!({
            "status":         "error",
            "code":           "internal",
            "message":        "internal error",
            "correlation_id": correlation_id,
          })),
        )
          .into_response()
      }
    }
  }
}
