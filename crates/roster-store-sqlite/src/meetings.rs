//! Meeting coordinator: every function here runs inside the caller's
//! transaction and keeps `calendar_entries` in step with `meetings`.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use roster_core::{
  Entity,
  calendar::TimeWindow,
  meeting::Meeting,
  person::Profile,
};
use uuid::Uuid;

use crate::{
  Error, Result, calendar, directory,
  encode::{MEETING_COLUMNS, RawMeeting, decode_uuid, encode_dt, encode_uuid},
};

// ─── Reads ───────────────────────────────────────────────────────────────────

fn participants(conn: &Connection, meeting_id: &str) -> Result<Vec<Uuid>> {
  let mut stmt = conn.prepare(
    "SELECT profile_id FROM meeting_participants WHERE meeting_id = ?1 ORDER BY added_at, rowid",
  )?;
  let ids = stmt
    .query_map(rusqlite::params![meeting_id], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  ids.iter().map(|s| decode_uuid(s)).collect()
}

fn hydrate(conn: &Connection, raw: RawMeeting) -> Result<Meeting> {
  let participants = participants(conn, &raw.meeting_id)?;
  raw.into_meeting(participants)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<Meeting>> {
  let raw = conn
    .query_row(
      &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE meeting_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawMeeting::from_row,
    )
    .optional()?;
  raw.map(|r| hydrate(conn, r)).transpose()
}

fn require(conn: &Connection, id: Uuid) -> Result<Meeting> {
  get(conn, id)?.ok_or_else(|| roster_core::Error::not_found(Entity::Meeting, id).into())
}

/// Meetings organized or attended by `profile_id`, ordered by start time.
pub fn list_for(conn: &Connection, profile_id: Uuid) -> Result<Vec<Meeting>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MEETING_COLUMNS} FROM meetings
     WHERE organizer_id = ?1
        OR meeting_id IN (SELECT meeting_id FROM meeting_participants WHERE profile_id = ?1)
     ORDER BY start_at, end_at"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(profile_id)], RawMeeting::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(|r| hydrate(conn, r)).collect()
}

fn ensure_organizer(meeting: &Meeting, actor: Uuid) -> Result<()> {
  if meeting.organizer_id != actor {
    return Err(
      roster_core::Error::Forbidden(format!(
        "only the organizer may change meeting {}",
        meeting.meeting_id
      ))
      .into(),
    );
  }
  Ok(())
}

fn require_by_name(conn: &Connection, username: &str) -> Result<Profile> {
  directory::profile_by_name(conn, username)?
    .ok_or_else(|| roster_core::Error::not_found(Entity::Profile, username).into())
}

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn create(
  conn: &Connection,
  organizer: Uuid,
  window: TimeWindow,
  now: DateTime<Utc>,
) -> Result<Meeting> {
  directory::require_profile(conn, organizer)?;
  calendar::ensure_free(conn, organizer, &window)?;

  let meeting = Meeting {
    meeting_id: Uuid::new_v4(),
    organizer_id: organizer,
    window,
    participants: Vec::new(),
    created_at: now,
  };

  conn.execute(
    "INSERT INTO meetings (meeting_id, organizer_id, start_at, end_at, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(meeting.meeting_id),
      encode_uuid(organizer),
      encode_dt(window.start),
      encode_dt(window.end),
      encode_dt(now),
    ],
  )?;
  calendar::insert_entry(conn, organizer, meeting.reservation(), window)?;

  Ok(meeting)
}

pub fn add_participant(
  conn: &Connection,
  actor: Uuid,
  meeting_id: Uuid,
  username: &str,
  now: DateTime<Utc>,
) -> Result<Meeting> {
  let mut meeting = require(conn, meeting_id)?;
  ensure_organizer(&meeting, actor)?;

  let person = require_by_name(conn, username)?;
  let organizer = directory::require_profile(conn, meeting.organizer_id)?;
  organizer.ensure_same_team(&person)?;

  if meeting.is_attendee(person.profile_id) {
    return Err(
      roster_core::Error::Duplicate(format!(
        "{username} already attends meeting {meeting_id}"
      ))
      .into(),
    );
  }
  calendar::ensure_free(conn, person.profile_id, &meeting.window)?;

  conn.execute(
    "INSERT INTO meeting_participants (meeting_id, profile_id, added_at) VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(meeting_id), encode_uuid(person.profile_id), encode_dt(now)],
  )?;
  calendar::insert_entry(conn, person.profile_id, meeting.reservation(), meeting.window)?;

  meeting.participants.push(person.profile_id);
  Ok(meeting)
}

pub fn remove_participant(
  conn: &Connection,
  actor: Uuid,
  meeting_id: Uuid,
  username: &str,
) -> Result<Meeting> {
  let mut meeting = require(conn, meeting_id)?;
  ensure_organizer(&meeting, actor)?;

  let person = require_by_name(conn, username)?;
  if person.profile_id == meeting.organizer_id {
    return Err(
      roster_core::Error::validation("name", "the organizer cannot leave; cancel the meeting")
        .into(),
    );
  }

  let removed = conn.execute(
    "DELETE FROM meeting_participants WHERE meeting_id = ?1 AND profile_id = ?2",
    rusqlite::params![encode_uuid(meeting_id), encode_uuid(person.profile_id)],
  )?;
  if removed == 0 {
    return Err(roster_core::Error::not_found(Entity::Participant, username).into());
  }
  calendar::delete_entry(conn, person.profile_id, meeting.reservation())?;

  meeting.participants.retain(|id| *id != person.profile_id);
  Ok(meeting)
}

/// Cancel a meeting. Returns the number of reservations released.
pub fn cancel(conn: &Connection, actor: Uuid, meeting_id: Uuid) -> Result<usize> {
  let meeting = require(conn, meeting_id)?;
  ensure_organizer(&meeting, actor)?;

  let released = calendar::delete_all(conn, meeting.reservation())?;
  let id = encode_uuid(meeting_id);
  conn.execute("DELETE FROM meeting_participants WHERE meeting_id = ?1", rusqlite::params![id])?;
  let deleted = conn.execute("DELETE FROM meetings WHERE meeting_id = ?1", rusqlite::params![id])?;
  if deleted != 1 {
    return Err(Error::Consistency(format!(
      "expected to delete meeting {meeting_id}, deleted {deleted} rows"
    )));
  }

  Ok(released)
}
