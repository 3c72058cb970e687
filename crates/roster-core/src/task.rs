//! Tasks, their progress status and their evaluation.
//!
//! A task reserves the executor's calendar from the moment it is created
//! until its deadline. The reservation follows the task when it is
//! reassigned or its deadline moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  calendar::{Reservation, TimeWindow},
  person::validate_name,
};

// ─── Task ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub task_id:     Uuid,
  pub name:        String,
  pub assigned_by: Uuid,
  pub assigned_to: Uuid,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
  pub deadline:    DateTime<Utc>,
}

impl Task {
  pub fn reservation(&self) -> Reservation { Reservation::Task(self.task_id) }

  /// Whether `profile_id` assigned or executes this task.
  pub fn involves(&self, profile_id: Uuid) -> bool {
    self.assigned_by == profile_id || self.assigned_to == profile_id
  }

  /// The executor's reserved window, `[created_at, deadline)`.
  pub fn window(&self) -> Result<TimeWindow> {
    TimeWindow::new(self.created_at, self.deadline)
      .map_err(|_| Error::validation("deadline", "must be later than the task's creation time"))
  }

  /// Read-modify-write: apply only the fields present in `patch`.
  pub fn patched(&self, patch: &TaskPatch) -> Result<Task> {
    let mut next = self.clone();
    if let Some(name) = &patch.name {
      validate_name("name", name)?;
      next.name = name.clone();
    }
    if let Some(assignee) = patch.assigned_to {
      next.assigned_to = assignee;
    }
    if let Some(deadline) = patch.deadline {
      next.deadline = deadline;
    }
    next.window()?;
    Ok(next)
  }
}

/// Input to [`crate::store::ScheduleStore::create_task`].
/// `created_at` and the assignor come from the store and the actor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
  pub name:        String,
  pub assigned_to: Uuid,
  pub deadline:    DateTime<Utc>,
}

impl NewTask {
  pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
    validate_name("name", &self.name)?;
    if self.deadline <= now {
      return Err(Error::validation("deadline", "must be in the future"));
    }
    Ok(())
  }
}

/// A partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
  #[serde(default)]
  pub name:        Option<String>,
  #[serde(default)]
  pub assigned_to: Option<Uuid>,
  #[serde(default)]
  pub deadline:    Option<DateTime<Utc>>,
}

impl TaskPatch {
  /// Whether the executor's reservation must be rewritten.
  pub fn moves_reservation(&self) -> bool {
    self.assigned_to.is_some() || self.deadline.is_some()
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  #[default]
  Pending,
  Deferred,
  Finished,
}

/// Progress of a task; exactly one per task, updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
  pub task_id:    Uuid,
  pub status:     Status,
  pub comment:    String,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
  pub status:  Status,
  #[serde(default)]
  pub comment: String,
}

impl StatusUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.comment.chars().count() > 128 {
      return Err(Error::validation("comment", "must be at most 128 characters"));
    }
    Ok(())
  }
}

// ─── Estimation ──────────────────────────────────────────────────────────────

/// A mark between [`Score::MIN`] and [`Score::MAX`], inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
  pub const MAX: u8 = 10;
  pub const MIN: u8 = 1;

  pub fn new(field: &'static str, value: i64) -> Result<Self> {
    match u8::try_from(value) {
      Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
      _ => Err(Error::validation(
        field,
        format!("must be between {} and {}, got {value}", Self::MIN, Self::MAX),
      )),
    }
  }

  pub fn get(self) -> u8 { self.0 }
}

/// Raw marks as submitted; see [`EstimationInput::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct EstimationInput {
  pub deadline_meeting: i64,
  pub completeness:     i64,
  pub quality:          i64,
}

impl EstimationInput {
  pub fn validate(&self) -> Result<NewEstimation> {
    Ok(NewEstimation {
      deadline_meeting: Score::new("deadline_meeting", self.deadline_meeting)?,
      completeness:     Score::new("completeness", self.completeness)?,
      quality:          Score::new("quality", self.quality)?,
    })
  }
}

/// Validated input to [`crate::store::ScheduleStore::estimate_task`].
#[derive(Debug, Clone, Copy)]
pub struct NewEstimation {
  pub deadline_meeting: Score,
  pub completeness:     Score,
  pub quality:          Score,
}

/// The assignor's evaluation of a task; at most one per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEstimation {
  pub estimation_id:    Uuid,
  pub task_id:          Uuid,
  pub created_at:       DateTime<Utc>,
  /// How well the deadline was kept.
  pub deadline_meeting: Score,
  pub completeness:     Score,
  pub quality:          Score,
}
