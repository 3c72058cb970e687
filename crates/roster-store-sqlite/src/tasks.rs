//! Task coordinator. A task always holds exactly one calendar entry, owned by
//! its current executor and spanning `[created_at, deadline)`.
//!
//! The schema allows at most one entry per task. An update that moves the
//! reservation (new executor or deadline) drops whatever the task holds and
//! writes a fresh entry, so a task found without its entry is repaired on
//! that update and a warning is logged.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use roster_core::{
  Entity,
  task::{
    NewEstimation, NewTask, Status, StatusUpdate, Task, TaskEstimation, TaskPatch, TaskStatus,
  },
};
use uuid::Uuid;

use crate::{
  Error, Result, calendar, directory,
  encode::{
    ESTIMATION_COLUMNS, RawEstimation, RawStatus, RawTask, STATUS_COLUMNS, TASK_COLUMNS,
    encode_dt, encode_status, encode_uuid, is_unique_violation,
  },
};

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<Task>> {
  conn
    .query_row(
      &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawTask::from_row,
    )
    .optional()?
    .map(RawTask::into_task)
    .transpose()
}

fn require(conn: &Connection, id: Uuid) -> Result<Task> {
  get(conn, id)?.ok_or_else(|| roster_core::Error::not_found(Entity::Task, id).into())
}

/// Tasks assigned by or to `profile_id`, nearest deadline first.
pub fn list_for(conn: &Connection, profile_id: Uuid) -> Result<Vec<Task>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {TASK_COLUMNS} FROM tasks
     WHERE assigned_by = ?1 OR assigned_to = ?1
     ORDER BY deadline, created_at"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(profile_id)], RawTask::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawTask::into_task).collect()
}

pub fn status(conn: &Connection, id: Uuid) -> Result<Option<TaskStatus>> {
  conn
    .query_row(
      &format!("SELECT {STATUS_COLUMNS} FROM task_statuses WHERE task_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawStatus::from_row,
    )
    .optional()?
    .map(RawStatus::into_status)
    .transpose()
}

/// Estimations of tasks executed by `profile_id`, newest first.
pub fn estimations_for(conn: &Connection, profile_id: Uuid) -> Result<Vec<TaskEstimation>> {
  let columns = ESTIMATION_COLUMNS
    .split(", ")
    .map(|c| format!("e.{c}"))
    .collect::<Vec<_>>()
    .join(", ");
  let mut stmt = conn.prepare(&format!(
    "SELECT {columns} FROM task_estimations e
     JOIN tasks t ON t.task_id = e.task_id
     WHERE t.assigned_to = ?1
     ORDER BY e.created_at DESC"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(profile_id)], RawEstimation::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawEstimation::into_estimation).collect()
}

// ─── Relationship checks ─────────────────────────────────────────────────────

fn ensure_assignor(task: &Task, actor: Uuid) -> Result<()> {
  if task.assigned_by != actor {
    return Err(
      roster_core::Error::Forbidden(format!("only the assignor may change task {}", task.task_id))
        .into(),
    );
  }
  Ok(())
}

fn ensure_executor(task: &Task, actor: Uuid) -> Result<()> {
  if task.assigned_to != actor {
    return Err(
      roster_core::Error::Forbidden(format!(
        "only the executor may report progress on task {}",
        task.task_id
      ))
      .into(),
    );
  }
  Ok(())
}

/// Both ends of an assignment must exist and share a company.
fn ensure_assignable(conn: &Connection, assignor: Uuid, assignee: Uuid) -> Result<()> {
  let assignor = directory::require_profile(conn, assignor)?;
  let assignee = directory::require_profile(conn, assignee)?;
  assignor.ensure_same_team(&assignee)?;
  Ok(())
}

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn create(conn: &Connection, actor: Uuid, input: NewTask, now: DateTime<Utc>) -> Result<Task> {
  ensure_assignable(conn, actor, input.assigned_to)?;
  input.validate(now)?;

  let task = Task {
    task_id:     Uuid::new_v4(),
    name:        input.name,
    assigned_by: actor,
    assigned_to: input.assigned_to,
    created_at:  now,
    deadline:    input.deadline,
  };
  let window = task.window()?;

  conn.execute(
    "INSERT INTO tasks (task_id, name, assigned_by, assigned_to, created_at, deadline)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(task.task_id),
      task.name,
      encode_uuid(task.assigned_by),
      encode_uuid(task.assigned_to),
      encode_dt(task.created_at),
      encode_dt(task.deadline),
    ],
  )?;
  calendar::insert_entry(conn, task.assigned_to, task.reservation(), window)?;
  conn.execute(
    "INSERT INTO task_statuses (task_id, status, comment, updated_at) VALUES (?1, ?2, '', ?3)",
    rusqlite::params![encode_uuid(task.task_id), encode_status(Status::Pending), encode_dt(now)],
  )?;

  Ok(task)
}

pub fn update(conn: &Connection, actor: Uuid, id: Uuid, patch: &TaskPatch) -> Result<Task> {
  let task = require(conn, id)?;
  ensure_assignor(&task, actor)?;

  let next = task.patched(patch)?;
  if patch.assigned_to.is_some() {
    ensure_assignable(conn, next.assigned_by, next.assigned_to)?;
  }

  conn.execute(
    "UPDATE tasks SET name = ?2, assigned_to = ?3, deadline = ?4 WHERE task_id = ?1",
    rusqlite::params![
      encode_uuid(id),
      next.name,
      encode_uuid(next.assigned_to),
      encode_dt(next.deadline),
    ],
  )?;

  if patch.moves_reservation() {
    let released = calendar::delete_all(conn, task.reservation())?;
    if released != 1 {
      tracing::warn!(task_id = %id, released, "task held an unexpected number of entries");
    }
    calendar::insert_entry(conn, next.assigned_to, next.reservation(), next.window()?)?;
  }

  Ok(next)
}

pub fn delete(conn: &Connection, actor: Uuid, id: Uuid) -> Result<()> {
  let task = require(conn, id)?;
  ensure_assignor(&task, actor)?;

  calendar::delete_entry(conn, task.assigned_to, task.reservation())?;
  let deleted =
    conn.execute("DELETE FROM tasks WHERE task_id = ?1", rusqlite::params![encode_uuid(id)])?;
  if deleted != 1 {
    return Err(Error::Consistency(format!(
      "expected to delete task {id}, deleted {deleted} rows"
    )));
  }
  Ok(())
}

pub fn update_status(
  conn: &Connection,
  actor: Uuid,
  id: Uuid,
  update: StatusUpdate,
  now: DateTime<Utc>,
) -> Result<TaskStatus> {
  update.validate()?;
  let task = require(conn, id)?;
  ensure_executor(&task, actor)?;

  let updated = conn.execute(
    "UPDATE task_statuses SET status = ?2, comment = ?3, updated_at = ?4 WHERE task_id = ?1",
    rusqlite::params![
      encode_uuid(id),
      encode_status(update.status),
      update.comment,
      encode_dt(now),
    ],
  )?;
  if updated != 1 {
    return Err(roster_core::Error::not_found(Entity::TaskStatus, id).into());
  }

  Ok(TaskStatus {
    task_id:    id,
    status:     update.status,
    comment:    update.comment,
    updated_at: now,
  })
}

pub fn estimate(
  conn: &Connection,
  actor: Uuid,
  id: Uuid,
  input: NewEstimation,
  now: DateTime<Utc>,
) -> Result<TaskEstimation> {
  let task = require(conn, id)?;
  ensure_assignor(&task, actor)?;

  let estimation = TaskEstimation {
    estimation_id:    Uuid::new_v4(),
    task_id:          id,
    created_at:       now,
    deadline_meeting: input.deadline_meeting,
    completeness:     input.completeness,
    quality:          input.quality,
  };

  conn
    .execute(
      "INSERT INTO task_estimations (
         estimation_id, task_id, created_at, deadline_meeting, completeness, quality
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_uuid(estimation.estimation_id),
        encode_uuid(id),
        encode_dt(now),
        estimation.deadline_meeting.get(),
        estimation.completeness.get(),
        estimation.quality.get(),
      ],
    )
    .map_err(|e| {
      if is_unique_violation(&e) {
        roster_core::Error::Duplicate(format!("task {id} has already been estimated")).into()
      } else {
        Error::from(e)
      }
    })?;

  Ok(estimation)
}
