//! Calendar entries: insert, delete by owner and reservation, overlap checks.
//!
//! Only the meeting and task modules write here, each touching rows of its
//! own reservation kind.

use rusqlite::Connection;
use roster_core::{
  calendar::{self, CalendarEntry, Reservation, TimeWindow},
  Entity,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{ENTRY_COLUMNS, RawEntry, encode_dt, encode_reservation, encode_uuid, is_unique_violation},
};

/// Every entry owned by `owner`, ordered by start time.
pub fn entries_for(conn: &Connection, owner: Uuid) -> Result<Vec<CalendarEntry>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ENTRY_COLUMNS} FROM calendar_entries WHERE owner_id = ?1 ORDER BY start_at, end_at"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(owner)], RawEntry::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawEntry::into_entry).collect()
}

/// Every entry made on behalf of `reservation`, whoever owns it.
pub fn entries_of(conn: &Connection, reservation: Reservation) -> Result<Vec<CalendarEntry>> {
  let (meeting_id, task_id) = encode_reservation(reservation);
  let mut stmt = conn.prepare(&format!(
    "SELECT {ENTRY_COLUMNS} FROM calendar_entries
     WHERE meeting_id IS ?1 AND task_id IS ?2
     ORDER BY owner_id"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![meeting_id, task_id], RawEntry::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawEntry::into_entry).collect()
}

/// Availability check for a meeting in `window`.
pub fn is_free(conn: &Connection, owner: Uuid, window: &TimeWindow) -> Result<bool> {
  Ok(calendar::is_free(&entries_for(conn, owner)?, window))
}

/// Fail with [`roster_core::Error::Busy`] unless `owner` is free in `window`.
pub fn ensure_free(conn: &Connection, owner: Uuid, window: &TimeWindow) -> Result<()> {
  let entries = entries_for(conn, owner)?;
  if let Some(hit) = calendar::first_conflict(&entries, window) {
    tracing::debug!(
      owner = %owner,
      requested = %window,
      blocking = %hit.window,
      "calendar conflict"
    );
    return Err(roster_core::Error::Busy { owner, window: *window }.into());
  }
  Ok(())
}

pub fn insert_entry(
  conn: &Connection,
  owner: Uuid,
  reservation: Reservation,
  window: TimeWindow,
) -> Result<CalendarEntry> {
  let entry = CalendarEntry {
    entry_id: Uuid::new_v4(),
    owner_id: owner,
    reservation,
    window,
  };
  let (meeting_id, task_id) = encode_reservation(reservation);

  conn
    .execute(
      "INSERT INTO calendar_entries (entry_id, owner_id, meeting_id, task_id, start_at, end_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_uuid(entry.entry_id),
        encode_uuid(owner),
        meeting_id,
        task_id,
        encode_dt(window.start),
        encode_dt(window.end),
      ],
    )
    .map_err(|e| {
      if is_unique_violation(&e) {
        Error::Consistency(format!(
          "profile {owner} already holds a reservation for {reservation:?}"
        ))
      } else {
        Error::from(e)
      }
    })?;

  Ok(entry)
}

/// Delete the entry `owner` holds for `reservation`.
pub fn delete_entry(conn: &Connection, owner: Uuid, reservation: Reservation) -> Result<()> {
  let (meeting_id, task_id) = encode_reservation(reservation);
  let deleted = conn.execute(
    "DELETE FROM calendar_entries WHERE owner_id = ?1 AND meeting_id IS ?2 AND task_id IS ?3",
    rusqlite::params![encode_uuid(owner), meeting_id, task_id],
  )?;
  if deleted == 0 {
    return Err(
      roster_core::Error::not_found(Entity::CalendarEntry, format!("{reservation:?} for {owner}"))
        .into(),
    );
  }
  Ok(())
}

/// Delete every entry made for `reservation`. Idempotent.
pub fn delete_all(conn: &Connection, reservation: Reservation) -> Result<usize> {
  let (meeting_id, task_id) = encode_reservation(reservation);
  Ok(conn.execute(
    "DELETE FROM calendar_entries WHERE meeting_id IS ?1 AND task_id IS ?2",
    rusqlite::params![meeting_id, task_id],
  )?)
}
