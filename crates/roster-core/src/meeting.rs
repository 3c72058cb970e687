//! Meetings.
//!
//! A meeting reserves its window in the calendar of the organizer and of
//! every participant. Cancelling it removes all of those reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{Reservation, TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
  pub meeting_id:   Uuid,
  pub organizer_id: Uuid,
  #[serde(flatten)]
  pub window:       TimeWindow,
  /// Participants other than the organizer, in the order they were added.
  pub participants: Vec<Uuid>,
  pub created_at:   DateTime<Utc>,
}

impl Meeting {
  pub fn reservation(&self) -> Reservation { Reservation::Meeting(self.meeting_id) }

  /// The organizer followed by every participant.
  pub fn attendees(&self) -> impl Iterator<Item = Uuid> + '_ {
    std::iter::once(self.organizer_id).chain(self.participants.iter().copied())
  }

  pub fn is_attendee(&self, profile_id: Uuid) -> bool {
    self.attendees().any(|id| id == profile_id)
  }
}
