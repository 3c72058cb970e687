//! Calendar reservations and the availability rule.
//!
//! A calendar entry marks its owner as occupied for a window of time on
//! behalf of exactly one meeting or task. Entries are never created on their
//! own; they are written and removed together with the record that owns them.
//!
//! Windows are half-open, `[start, end)`, so back-to-back bookings do not
//! collide. Only meeting reservations are exclusive: a task reservation spans
//! the whole working period up to its deadline and never blocks a meeting.

use std::fmt;

use chrono::{Datelike as _, DateTime, Months, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── TimeWindow ──────────────────────────────────────────────────────────────

/// A half-open interval of time. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  #[serde(rename = "start_at")]
  pub start: DateTime<Utc>,
  #[serde(rename = "end_at")]
  pub end:   DateTime<Utc>,
}

impl TimeWindow {
  /// Build a window, rejecting empty or inverted intervals.
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
    if start >= end {
      return Err(Error::validation(
        "end_at",
        format!("window must end after it starts ({start} >= {end})"),
      ));
    }
    Ok(Self { start, end })
  }

  /// The single overlap predicate used for every conflict decision.
  pub fn overlaps(&self, other: &TimeWindow) -> bool {
    self.start < other.end && other.start < self.end
  }
}

impl fmt::Display for TimeWindow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
  }
}

// ─── Reservation ─────────────────────────────────────────────────────────────

/// What a calendar entry is reserved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Reservation {
  Meeting(Uuid),
  Task(Uuid),
}

impl Reservation {
  pub fn id(&self) -> Uuid {
    match self {
      Self::Meeting(id) | Self::Task(id) => *id,
    }
  }

  /// Whether this reservation makes its owner unavailable for meetings.
  pub fn is_exclusive(&self) -> bool { matches!(self, Self::Meeting(_)) }
}

// ─── CalendarEntry ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
  pub entry_id:    Uuid,
  pub owner_id:    Uuid,
  pub reservation: Reservation,
  #[serde(flatten)]
  pub window:      TimeWindow,
}

// ─── Availability ────────────────────────────────────────────────────────────

/// The first exclusive entry among `entries` that overlaps `window`.
pub fn first_conflict<'a>(
  entries: impl IntoIterator<Item = &'a CalendarEntry>,
  window: &TimeWindow,
) -> Option<&'a CalendarEntry> {
  entries
    .into_iter()
    .find(|e| e.reservation.is_exclusive() && e.window.overlaps(window))
}

/// `true` if none of `entries` stands in the way of a meeting in `window`.
pub fn is_free<'a>(
  entries: impl IntoIterator<Item = &'a CalendarEntry>,
  window: &TimeWindow,
) -> bool {
  first_conflict(entries, window).is_none()
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// The span of a calendar listing.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
  Daily,
  Monthly,
}

impl Period {
  /// The UTC day or calendar month containing `at`.
  pub fn window_containing(self, at: DateTime<Utc>) -> TimeWindow {
    let day = at.date_naive();
    match self {
      Self::Daily => {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        TimeWindow { start, end: start + TimeDelta::days(1) }
      }
      Self::Monthly => {
        let first = day - TimeDelta::days(i64::from(day.day0()));
        TimeWindow {
          start: first.and_time(NaiveTime::MIN).and_utc(),
          end:   (first + Months::new(1)).and_time(NaiveTime::MIN).and_utc(),
        }
      }
    }
  }
}
