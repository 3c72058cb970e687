//! Error types for `roster-core`.
//!
//! Every variant is an expected business outcome; callers turn them into
//! structured responses. Infrastructure failures live in the store crates.

use thiserror::Error;
use uuid::Uuid;

use crate::calendar::TimeWindow;

/// The kind of record a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Entity {
  #[strum(serialize = "company")]
  Company,
  #[strum(serialize = "profile")]
  Profile,
  #[strum(serialize = "meeting")]
  Meeting,
  #[strum(serialize = "participant")]
  Participant,
  #[strum(serialize = "task")]
  Task,
  #[strum(serialize = "task status")]
  TaskStatus,
  #[strum(serialize = "calendar entry")]
  CalendarEntry,
}

#[derive(Debug, Clone, Error)]
pub enum Error {
  /// Malformed input: bad time ordering, empty names, out-of-range scores.
  #[error("invalid {field}: {reason}")]
  Validation { field: &'static str, reason: String },

  /// The owner already holds an exclusive reservation overlapping `window`.
  #[error("profile {owner} is already booked during {window}")]
  Busy { owner: Uuid, window: TimeWindow },

  #[error("profiles {0} and {1} do not belong to the same company")]
  CrossTeam(Uuid, Uuid),

  #[error("{0}")]
  Duplicate(String),

  /// The actor lacks the relationship or authority an operation requires.
  #[error("{0}")]
  Forbidden(String),

  #[error("{entity} not found: {key}")]
  NotFound { entity: Entity, key: String },
}

impl Error {
  pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Validation { field, reason: reason.into() }
  }

  pub fn not_found(entity: Entity, key: impl ToString) -> Self {
    Self::NotFound { entity, key: key.to_string() }
  }

  /// Stable, machine-checkable marker for this outcome.
  pub fn code(&self) -> &'static str {
    match self {
      Self::Validation { .. } => "validation",
      Self::Busy { .. } => "busy",
      Self::CrossTeam(..) => "cross_team",
      Self::Duplicate(_) => "duplicate",
      Self::Forbidden(_) => "forbidden",
      Self::NotFound { .. } => "not_found",
    }
  }
}

/// Implemented by backend error types that may wrap a domain [`Error`].
///
/// The API layer uses this to tell business outcomes apart from
/// infrastructure failures without knowing the concrete backend.
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
