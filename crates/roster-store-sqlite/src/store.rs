//! [`SqliteStore`], the SQLite implementation of [`ScheduleStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use roster_core::{
  calendar::{CalendarEntry, Reservation, TimeWindow},
  meeting::Meeting,
  person::{Authority, Company, NewProfile, Profile, Registration},
  store::ScheduleStore,
  task::{NewEstimation, NewTask, StatusUpdate, Task, TaskEstimation, TaskPatch, TaskStatus},
};

use crate::{Result, calendar, directory, meetings, schema::SCHEMA, tasks};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// All calls run one at a time on the connection's dedicated thread, and
/// every write runs in its own `BEGIN IMMEDIATE` transaction, so an
/// availability check and the reservation that follows it cannot interleave
/// with another writer.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Clock,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, clock: Arc::new(Utc::now) })
  }

  /// Replace the wall clock used for `created_at`-style timestamps.
  pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Every calendar entry made for a meeting or task, whoever owns it.
  pub async fn reservation_entries(&self, reservation: Reservation) -> Result<Vec<CalendarEntry>> {
    self.read(move |conn| calendar::entries_of(conn, reservation)).await
  }

  /// Run `f` against the connection outside any explicit transaction.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside an immediate transaction. Any error rolls back every
  /// statement `f` executed.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(in_transaction(conn, f))).await?
  }
}

fn in_transaction<T>(
  conn: &mut Connection,
  f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let value = f(&tx)?;
  tx.commit()?;
  Ok(value)
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = crate::Error;

  fn now(&self) -> DateTime<Utc> { (self.clock)() }

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn create_company(&self, name: String) -> Result<Company> {
    let now = self.now();
    let company = self.write(move |conn| directory::create_company(conn, name, now)).await?;
    tracing::info!(company_id = %company.company_id, name = %company.name, "company created");
    Ok(company)
  }

  async fn list_companies(&self) -> Result<Vec<Company>> {
    self.read(directory::list_companies).await
  }

  async fn register_profile(&self, input: NewProfile) -> Result<Registration> {
    let now = self.now();
    let registration = self
      .write(move |conn| directory::insert_profile(conn, input, Authority::Employee, false, now))
      .await?;
    tracing::info!(
      profile_id = %registration.profile.profile_id,
      username = %registration.profile.username,
      "profile registered"
    );
    Ok(registration)
  }

  async fn bootstrap_administrator(&self, username: String) -> Result<Registration> {
    let now = self.now();
    let input = NewProfile { username, company_id: None };
    let registration = self
      .write(move |conn| directory::insert_profile(conn, input, Authority::Boss, true, now))
      .await?;
    tracing::info!(
      profile_id = %registration.profile.profile_id,
      username = %registration.profile.username,
      "administrator bootstrapped"
    );
    Ok(registration)
  }

  async fn profile_by_token(&self, token: String) -> Result<Option<Profile>> {
    self.read(move |conn| directory::profile_by_token(conn, &token)).await
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self.read(move |conn| directory::profile_by_id(conn, id)).await
  }

  async fn find_profile(&self, username: String) -> Result<Option<Profile>> {
    self.read(move |conn| directory::profile_by_name(conn, &username)).await
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    self.read(directory::list_profiles).await
  }

  async fn set_company(&self, profile_id: Uuid, company_id: Uuid) -> Result<Profile> {
    let profile =
      self.write(move |conn| directory::set_company(conn, profile_id, company_id)).await?;
    tracing::info!(profile_id = %profile_id, company_id = %company_id, "profile moved");
    Ok(profile)
  }

  async fn set_authority(&self, profile_id: Uuid, authority: Authority) -> Result<Profile> {
    let profile =
      self.write(move |conn| directory::set_authority(conn, profile_id, authority)).await?;
    tracing::info!(profile_id = %profile_id, authority = %authority, "authority changed");
    Ok(profile)
  }

  // ── Calendar ──────────────────────────────────────────────────────────────

  async fn is_free(&self, owner: Uuid, window: TimeWindow) -> Result<bool> {
    self.read(move |conn| calendar::is_free(conn, owner, &window)).await
  }

  async fn calendar(
    &self,
    owner: Uuid,
    window: Option<TimeWindow>,
  ) -> Result<Vec<CalendarEntry>> {
    let entries = self.read(move |conn| calendar::entries_for(conn, owner)).await?;
    Ok(match window {
      Some(w) => entries.into_iter().filter(|e| e.window.overlaps(&w)).collect(),
      None => entries,
    })
  }

  // ── Meetings ──────────────────────────────────────────────────────────────

  async fn create_meeting(&self, actor: Uuid, window: TimeWindow) -> Result<Meeting> {
    let now = self.now();
    let meeting = self.write(move |conn| meetings::create(conn, actor, window, now)).await?;
    tracing::info!(
      meeting_id = %meeting.meeting_id,
      organizer_id = %actor,
      window = %window,
      "meeting scheduled"
    );
    Ok(meeting)
  }

  async fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>> {
    self.read(move |conn| meetings::get(conn, id)).await
  }

  async fn list_meetings(&self, profile_id: Uuid) -> Result<Vec<Meeting>> {
    self.read(move |conn| meetings::list_for(conn, profile_id)).await
  }

  async fn add_participant(
    &self,
    actor: Uuid,
    meeting_id: Uuid,
    username: String,
  ) -> Result<Meeting> {
    let now = self.now();
    let name = username.clone();
    let meeting = self
      .write(move |conn| meetings::add_participant(conn, actor, meeting_id, &name, now))
      .await?;
    tracing::info!(meeting_id = %meeting_id, username = %username, "participant added");
    Ok(meeting)
  }

  async fn remove_participant(
    &self,
    actor: Uuid,
    meeting_id: Uuid,
    username: String,
  ) -> Result<Meeting> {
    let name = username.clone();
    let meeting = self
      .write(move |conn| meetings::remove_participant(conn, actor, meeting_id, &name))
      .await?;
    tracing::info!(meeting_id = %meeting_id, username = %username, "participant removed");
    Ok(meeting)
  }

  async fn cancel_meeting(&self, actor: Uuid, meeting_id: Uuid) -> Result<()> {
    let released = self.write(move |conn| meetings::cancel(conn, actor, meeting_id)).await?;
    tracing::info!(meeting_id = %meeting_id, released, "meeting cancelled");
    Ok(())
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  async fn create_task(&self, actor: Uuid, input: NewTask) -> Result<Task> {
    let now = self.now();
    let task = self.write(move |conn| tasks::create(conn, actor, input, now)).await?;
    tracing::info!(
      task_id = %task.task_id,
      assigned_by = %task.assigned_by,
      assigned_to = %task.assigned_to,
      "task assigned"
    );
    Ok(task)
  }

  async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
    self.read(move |conn| tasks::get(conn, id)).await
  }

  async fn list_tasks(&self, profile_id: Uuid) -> Result<Vec<Task>> {
    self.read(move |conn| tasks::list_for(conn, profile_id)).await
  }

  async fn update_task(&self, actor: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task> {
    let task = self.write(move |conn| tasks::update(conn, actor, id, &patch)).await?;
    tracing::info!(task_id = %id, assigned_to = %task.assigned_to, "task updated");
    Ok(task)
  }

  async fn delete_task(&self, actor: Uuid, id: Uuid) -> Result<()> {
    self.write(move |conn| tasks::delete(conn, actor, id)).await?;
    tracing::info!(task_id = %id, "task deleted");
    Ok(())
  }

  async fn task_status(&self, id: Uuid) -> Result<Option<TaskStatus>> {
    self.read(move |conn| tasks::status(conn, id)).await
  }

  async fn update_task_status(
    &self,
    actor: Uuid,
    id: Uuid,
    update: StatusUpdate,
  ) -> Result<TaskStatus> {
    let now = self.now();
    let status = self.write(move |conn| tasks::update_status(conn, actor, id, update, now)).await?;
    tracing::info!(task_id = %id, status = %status.status, "task status updated");
    Ok(status)
  }

  async fn estimate_task(
    &self,
    actor: Uuid,
    id: Uuid,
    input: NewEstimation,
  ) -> Result<TaskEstimation> {
    let now = self.now();
    let estimation = self.write(move |conn| tasks::estimate(conn, actor, id, input, now)).await?;
    tracing::info!(task_id = %id, estimation_id = %estimation.estimation_id, "task estimated");
    Ok(estimation)
  }

  async fn list_estimations(&self, profile_id: Uuid) -> Result<Vec<TaskEstimation>> {
    self.read(move |conn| tasks::estimations_for(conn, profile_id)).await
  }
}
