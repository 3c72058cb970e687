//! The `ScheduleStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, `roster-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Every mutating operation is a single logical unit: the checks it performs
//! and the records it writes (the owning meeting or task together with its
//! calendar entries) either all take effect or none do. Implementations must
//! make the availability check and the reservation that follows it atomic
//! with respect to concurrent callers.
//!
//! Operations acting on behalf of someone take the acting profile's id as
//! `actor`. Relationship rules (organizer, assignor, executor, same team) are
//! enforced here; coarse role gates are left to the caller.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  DomainError,
  calendar::{CalendarEntry, TimeWindow},
  meeting::Meeting,
  person::{Authority, Company, NewProfile, Profile, Registration},
  task::{NewEstimation, NewTask, StatusUpdate, Task, TaskEstimation, TaskPatch, TaskStatus},
};

/// Abstraction over a Roster storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  /// The store's notion of the current time. Timestamps it records and
  /// relative queries such as "today's calendar" are both taken from here.
  fn now(&self) -> DateTime<Utc>;

  // ── Directory ─────────────────────────────────────────────────────────

  /// Create a company. Names are unique.
  fn create_company(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  fn list_companies(
    &self,
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + '_;

  /// Register an employee and issue its API token.
  fn register_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  /// Register a top-manager administrator. Used to seed a fresh deployment.
  fn bootstrap_administrator(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  /// Resolve the profile an API token was issued to.
  fn profile_by_token(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn find_profile(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Move a profile into a company.
  fn set_company(
    &self,
    profile_id: Uuid,
    company_id: Uuid,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Change a profile's authority level. Promotion to
  /// [`Authority::Boss`] is refused: there is one top manager.
  fn set_authority(
    &self,
    profile_id: Uuid,
    authority: Authority,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Calendar ──────────────────────────────────────────────────────────

  /// `true` if `owner` holds no exclusive reservation overlapping `window`.
  fn is_free(
    &self,
    owner: Uuid,
    window: TimeWindow,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Entries owned by `owner`, restricted to those overlapping `window` if
  /// given, ordered by start time.
  fn calendar(
    &self,
    owner: Uuid,
    window: Option<TimeWindow>,
  ) -> impl Future<Output = Result<Vec<CalendarEntry>, Self::Error>> + Send + '_;

  // ── Meetings ──────────────────────────────────────────────────────────

  /// Schedule a meeting organized by `actor` and reserve the organizer's
  /// calendar. Fails if the organizer is busy.
  fn create_meeting(
    &self,
    actor: Uuid,
    window: TimeWindow,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + '_;

  fn get_meeting(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// Meetings `profile_id` organizes or attends, ordered by start time.
  fn list_meetings(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Meeting>, Self::Error>> + Send + '_;

  /// Add the profile named `username` to a meeting organized by `actor` and
  /// reserve their calendar.
  fn add_participant(
    &self,
    actor: Uuid,
    meeting_id: Uuid,
    username: String,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + '_;

  /// Remove a participant and release their reservation.
  fn remove_participant(
    &self,
    actor: Uuid,
    meeting_id: Uuid,
    username: String,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + '_;

  /// Cancel a meeting, releasing every reservation it made.
  fn cancel_meeting(
    &self,
    actor: Uuid,
    meeting_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tasks ─────────────────────────────────────────────────────────────

  /// Assign a task from `actor` to a teammate, reserving the assignee's
  /// calendar until the deadline and starting it as pending.
  fn create_task(
    &self,
    actor: Uuid,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn get_task(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// Tasks `profile_id` assigned or executes, ordered by deadline.
  fn list_tasks(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  /// Apply a partial update. Only the assignor may update a task.
  fn update_task(
    &self,
    actor: Uuid,
    id: Uuid,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  /// Delete a task with its reservation, status and estimation.
  fn delete_task(
    &self,
    actor: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn task_status(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<TaskStatus>, Self::Error>> + Send + '_;

  /// Update progress. Only the executor may do this.
  fn update_task_status(
    &self,
    actor: Uuid,
    id: Uuid,
    update: StatusUpdate,
  ) -> impl Future<Output = Result<TaskStatus, Self::Error>> + Send + '_;

  /// Record the assignor's evaluation. A task is evaluated at most once.
  fn estimate_task(
    &self,
    actor: Uuid,
    id: Uuid,
    input: NewEstimation,
  ) -> impl Future<Output = Result<TaskEstimation, Self::Error>> + Send + '_;

  /// Evaluations of tasks executed by `profile_id`, newest first.
  fn list_estimations(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TaskEstimation>, Self::Error>> + Send + '_;
}
