//! Profiles and companies: the directory the scheduling core consults.
//!
//! A profile is an employee record, distinct from any login identity. It
//! carries company affiliation and an authority level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Ordered authority levels: `Employee < Manager < Boss`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
  #[default]
  Employee,
  Manager,
  /// Top manager of the organisation.
  Boss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub company_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:       Uuid,
  pub username:         String,
  pub company_id:       Option<Uuid>,
  pub authority:        Authority,
  pub is_administrator: bool,
  pub created_at:       DateTime<Utc>,
}

impl Profile {
  /// Both profiles belong to a company, and it is the same one.
  pub fn is_same_team(&self, other: &Profile) -> bool {
    self.company_id.is_some() && self.company_id == other.company_id
  }

  pub fn has_authority(&self, level: Authority) -> bool { self.authority >= level }

  /// Fail with [`Error::CrossTeam`] unless [`Self::is_same_team`] holds.
  pub fn ensure_same_team(&self, other: &Profile) -> Result<()> {
    if self.is_same_team(other) {
      Ok(())
    } else {
      Err(Error::CrossTeam(self.profile_id, other.profile_id))
    }
  }
}

/// Input to [`crate::store::ScheduleStore::register_profile`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub username:   String,
  pub company_id: Option<Uuid>,
}

impl NewProfile {
  pub fn validate(&self) -> Result<()> { validate_name("username", &self.username) }
}

/// A freshly registered profile together with its API token.
///
/// The token is only ever revealed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub profile: Profile,
  pub token:   String,
}

/// Reject blank names and names longer than 128 characters.
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(field, "must not be blank"));
  }
  if value.chars().count() > 128 {
    return Err(Error::validation(field, "must be at most 128 characters"));
  }
  Ok(())
}
