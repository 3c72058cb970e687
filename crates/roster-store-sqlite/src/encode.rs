//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (nanosecond
//! precision, `Z` suffix) so that they compare and sort correctly as text and
//! decode back to exactly the value that was written.
//! UUIDs are stored as hyphenated lowercase strings; enums by their
//! upper-case names.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::{
  calendar::{CalendarEntry, Reservation, TimeWindow},
  meeting::Meeting,
  person::{Authority, Company, Profile},
  task::{Score, Status, Task, TaskEstimation, TaskStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_window(start: &str, end: &str) -> Result<TimeWindow> {
  Ok(TimeWindow::new(decode_dt(start)?, decode_dt(end)?)?)
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn encode_authority(a: Authority) -> &'static str { a.into() }

pub fn decode_authority(s: &str) -> Result<Authority> {
  s.parse().map_err(|_| Error::Decode { column: "authority", value: s.to_owned() })
}

pub fn encode_status(s: Status) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse().map_err(|_| Error::Decode { column: "status", value: s.to_owned() })
}

fn decode_score(column: &'static str, value: i64) -> Result<Score> {
  Score::new(column, value)
    .map_err(|_| Error::Decode { column, value: value.to_string() })
}

// ─── Companies ────────────────────────────────────────────────────────────────

pub const COMPANY_COLUMNS: &str = "company_id, name, created_at";

/// Raw strings read directly from a `companies` row.
pub struct RawCompany {
  pub company_id: String,
  pub name:       String,
  pub created_at: String,
}

impl RawCompany {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      company_id: row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_company(self) -> Result<Company> {
    Ok(Company {
      company_id: decode_uuid(&self.company_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str =
  "profile_id, username, company_id, authority, is_administrator, created_at";

/// Raw values read directly from a `profiles` row (token excluded).
pub struct RawProfile {
  pub profile_id:       String,
  pub username:         String,
  pub company_id:       Option<String>,
  pub authority:        String,
  pub is_administrator: bool,
  pub created_at:       String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:       row.get(0)?,
      username:         row.get(1)?,
      company_id:       row.get(2)?,
      authority:        row.get(3)?,
      is_administrator: row.get(4)?,
      created_at:       row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:       decode_uuid(&self.profile_id)?,
      username:         self.username,
      company_id:       self.company_id.as_deref().map(decode_uuid).transpose()?,
      authority:        decode_authority(&self.authority)?,
      is_administrator: self.is_administrator,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

// ─── Meetings ─────────────────────────────────────────────────────────────────

pub const MEETING_COLUMNS: &str = "meeting_id, organizer_id, start_at, end_at, created_at";

/// Raw strings read from a `meetings` row; participants are loaded separately.
pub struct RawMeeting {
  pub meeting_id:   String,
  pub organizer_id: String,
  pub start_at:     String,
  pub end_at:       String,
  pub created_at:   String,
}

impl RawMeeting {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      meeting_id:   row.get(0)?,
      organizer_id: row.get(1)?,
      start_at:     row.get(2)?,
      end_at:       row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_meeting(self, participants: Vec<Uuid>) -> Result<Meeting> {
    Ok(Meeting {
      meeting_id: decode_uuid(&self.meeting_id)?,
      organizer_id: decode_uuid(&self.organizer_id)?,
      window: decode_window(&self.start_at, &self.end_at)?,
      participants,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Calendar entries ─────────────────────────────────────────────────────────

pub const ENTRY_COLUMNS: &str = "entry_id, owner_id, meeting_id, task_id, start_at, end_at";

/// Raw strings read directly from a `calendar_entries` row.
pub struct RawEntry {
  pub entry_id:   String,
  pub owner_id:   String,
  pub meeting_id: Option<String>,
  pub task_id:    Option<String>,
  pub start_at:   String,
  pub end_at:     String,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      owner_id:   row.get(1)?,
      meeting_id: row.get(2)?,
      task_id:    row.get(3)?,
      start_at:   row.get(4)?,
      end_at:     row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<CalendarEntry> {
    let reservation = match (self.meeting_id, self.task_id) {
      (Some(m), None) => Reservation::Meeting(decode_uuid(&m)?),
      (None, Some(t)) => Reservation::Task(decode_uuid(&t)?),
      _ => {
        return Err(Error::Decode {
          column: "meeting_id/task_id",
          value:  self.entry_id,
        });
      }
    };
    Ok(CalendarEntry {
      entry_id: decode_uuid(&self.entry_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      reservation,
      window: decode_window(&self.start_at, &self.end_at)?,
    })
  }
}

/// Split a reservation into its `(meeting_id, task_id)` column pair.
pub fn encode_reservation(r: Reservation) -> (Option<String>, Option<String>) {
  match r {
    Reservation::Meeting(id) => (Some(encode_uuid(id)), None),
    Reservation::Task(id) => (None, Some(encode_uuid(id))),
  }
}

// ─── Tasks ────────────────────────────────────────────────────────────────────

pub const TASK_COLUMNS: &str = "task_id, name, assigned_by, assigned_to, created_at, deadline";

/// Raw strings read directly from a `tasks` row.
pub struct RawTask {
  pub task_id:     String,
  pub name:        String,
  pub assigned_by: String,
  pub assigned_to: String,
  pub created_at:  String,
  pub deadline:    String,
}

impl RawTask {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      task_id:     row.get(0)?,
      name:        row.get(1)?,
      assigned_by: row.get(2)?,
      assigned_to: row.get(3)?,
      created_at:  row.get(4)?,
      deadline:    row.get(5)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      task_id:     decode_uuid(&self.task_id)?,
      name:        self.name,
      assigned_by: decode_uuid(&self.assigned_by)?,
      assigned_to: decode_uuid(&self.assigned_to)?,
      created_at:  decode_dt(&self.created_at)?,
      deadline:    decode_dt(&self.deadline)?,
    })
  }
}

pub const STATUS_COLUMNS: &str = "task_id, status, comment, updated_at";

/// Raw strings read directly from a `task_statuses` row.
pub struct RawStatus {
  pub task_id:    String,
  pub status:     String,
  pub comment:    String,
  pub updated_at: String,
}

impl RawStatus {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      task_id:    row.get(0)?,
      status:     row.get(1)?,
      comment:    row.get(2)?,
      updated_at: row.get(3)?,
    })
  }

  pub fn into_status(self) -> Result<TaskStatus> {
    Ok(TaskStatus {
      task_id:    decode_uuid(&self.task_id)?,
      status:     decode_status(&self.status)?,
      comment:    self.comment,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const ESTIMATION_COLUMNS: &str =
  "estimation_id, task_id, created_at, deadline_meeting, completeness, quality";

/// Raw values read directly from a `task_estimations` row.
pub struct RawEstimation {
  pub estimation_id:    String,
  pub task_id:          String,
  pub created_at:       String,
  pub deadline_meeting: i64,
  pub completeness:     i64,
  pub quality:          i64,
}

impl RawEstimation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      estimation_id:    row.get(0)?,
      task_id:          row.get(1)?,
      created_at:       row.get(2)?,
      deadline_meeting: row.get(3)?,
      completeness:     row.get(4)?,
      quality:          row.get(5)?,
    })
  }

  pub fn into_estimation(self) -> Result<TaskEstimation> {
    Ok(TaskEstimation {
      estimation_id:    decode_uuid(&self.estimation_id)?,
      task_id:          decode_uuid(&self.task_id)?,
      created_at:       decode_dt(&self.created_at)?,
      deadline_meeting: decode_score("deadline_meeting", self.deadline_meeting)?,
      completeness:     decode_score("completeness", self.completeness)?,
      quality:          decode_score("quality", self.quality)?,
    })
  }
}

/// `true` if `e` is a UNIQUE or PRIMARY KEY constraint violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone as _};

  use super::*;

  #[test]
  fn sub_microsecond_timestamps_survive_storage() {
    let base = Utc.with_ymd_and_hms(2025, 2, 10, 18, 0, 0).unwrap();
    let a = base + TimeDelta::nanoseconds(100);
    let b = base + TimeDelta::nanoseconds(900);

    assert_eq!(decode_dt(&encode_dt(a)).unwrap(), a);
    assert_ne!(encode_dt(a), encode_dt(b));
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(base).len(), encode_dt(b).len());
  }
}
