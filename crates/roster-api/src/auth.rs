//! Token authentication and coarse role gates.
//!
//! Callers send `Authorization: Token <key>`. The key is looked up in the
//! store; the resolved profile becomes the acting [`Actor`].

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use roster_core::{
  person::{Authority, Profile},
  store::ScheduleStore,
};

use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Actor(pub Profile);

impl Actor {
  pub fn id(&self) -> uuid::Uuid { self.0.profile_id }

  /// Fail with 403 unless the caller holds at least `level`.
  pub fn require(&self, level: Authority) -> Result<(), ApiError> {
    if self.0.has_authority(level) {
      Ok(())
    } else {
      Err(ApiError::forbidden(format!("{level} authority required")))
    }
  }

  pub fn require_administrator(&self) -> Result<(), ApiError> {
    if self.0.is_administrator {
      Ok(())
    } else {
      Err(ApiError::forbidden("administrator required"))
    }
  }
}

/// The key from an `Authorization: Token <key>` header, if well formed.
pub fn token_from(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Token ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<Arc<S>> for Actor
where
  S: ScheduleStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, store: &Arc<S>) -> Result<Self, Self::Rejection> {
    let token = token_from(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let profile = store
      .profile_by_token(token.to_owned())
      .await
      .map_err(ApiError::from_store)?
      .ok_or(ApiError::Unauthorized)?;
    tracing::debug!(profile_id = %profile.profile_id, "authenticated");
    Ok(Actor(profile))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn token_scheme_is_required() {
    assert_eq!(token_from(&headers("Token abc123")), Some("abc123"));
    assert_eq!(token_from(&headers("Bearer abc123")), None);
    assert_eq!(token_from(&headers("Token ")), None);
    assert_eq!(token_from(&HeaderMap::new()), None);
  }
}
