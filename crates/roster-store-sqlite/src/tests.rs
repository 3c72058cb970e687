//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use roster_core::{
  Error as CoreError,
  calendar::{Reservation, TimeWindow},
  person::{Authority, NewProfile, Profile},
  store::ScheduleStore,
  task::{EstimationInput, NewTask, Status, StatusUpdate, TaskPatch},
};
use uuid::Uuid;

use crate::{Error, SqliteStore, calendar, directory, schema::SCHEMA, tasks};

fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap() }

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 2, 10, hour, minute, 0).unwrap()
}

fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeWindow {
  TimeWindow::new(start, end).unwrap()
}

fn deadline() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 2, 23, 12, 0, 0).unwrap() }

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_clock(now)
}

async fn join(s: &SqliteStore, username: &str, company_id: Option<Uuid>) -> Profile {
  s.register_profile(NewProfile { username: username.into(), company_id })
    .await
    .unwrap()
    .profile
}

/// Two companies: a manager with two employees at Acme, one outsider at
/// Globex.
struct Office {
  store:     SqliteStore,
  manager:   Profile,
  employee:  Profile,
  colleague: Profile,
  outsider:  Profile,
}

async fn office() -> Office { staff(store().await).await }

async fn staff(store: SqliteStore) -> Office {
  let acme = store.create_company("Acme".into()).await.unwrap();
  let globex = store.create_company("Globex".into()).await.unwrap();

  let manager = join(&store, "olga", Some(acme.company_id)).await;
  let manager = store.set_authority(manager.profile_id, Authority::Manager).await.unwrap();
  let employee = join(&store, "egor", Some(acme.company_id)).await;
  let colleague = join(&store, "anna", Some(acme.company_id)).await;
  let outsider = join(&store, "xena", Some(globex.company_id)).await;

  Office { store, manager, employee, colleague, outsider }
}

fn t1(assignee: &Profile) -> NewTask {
  NewTask { name: "T1".into(), assigned_to: assignee.profile_id, deadline: deadline() }
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_issues_a_token_that_resolves_to_the_profile() {
  let s = store().await;
  let reg = s
    .register_profile(NewProfile { username: "egor".into(), company_id: None })
    .await
    .unwrap();
  assert_eq!(reg.profile.authority, Authority::Employee);
  assert!(!reg.profile.is_administrator);

  let found = s.profile_by_token(reg.token.clone()).await.unwrap().unwrap();
  assert_eq!(found, reg.profile);
  assert!(s.profile_by_token("nope".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  join(&s, "egor", None).await;
  let err = s
    .register_profile(NewProfile { username: "egor".into(), company_id: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate(_))), "{err:?}");
}

#[tokio::test]
async fn registering_into_unknown_company_fails() {
  let s = store().await;
  let err = s
    .register_profile(NewProfile { username: "egor".into(), company_id: Some(Uuid::new_v4()) })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");
}

#[tokio::test]
async fn duplicate_company_is_rejected() {
  let s = store().await;
  s.create_company("Acme".into()).await.unwrap();
  let err = s.create_company("Acme".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate(_))), "{err:?}");
  assert_eq!(s.list_companies().await.unwrap().len(), 1);
}

#[tokio::test]
async fn bootstrap_administrator_is_a_top_manager() {
  let s = store().await;
  let reg = s.bootstrap_administrator("root".into()).await.unwrap();
  assert!(reg.profile.is_administrator);
  assert_eq!(reg.profile.authority, Authority::Boss);
}

#[tokio::test]
async fn promotion_to_boss_is_refused() {
  let o = office().await;
  let err = o
    .store
    .set_authority(o.employee.profile_id, Authority::Boss)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Validation { field: "authority", .. })));

  let unchanged = o.store.get_profile(o.employee.profile_id).await.unwrap().unwrap();
  assert_eq!(unchanged.authority, Authority::Employee);
}

#[tokio::test]
async fn set_company_moves_a_profile() {
  let o = office().await;
  let globex = o.outsider.company_id.unwrap();
  let moved = o.store.set_company(o.employee.profile_id, globex).await.unwrap();
  assert_eq!(moved.company_id, Some(globex));
  assert!(moved.is_same_team(&o.outsider));
}

// ─── Meetings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn organizer_meeting_reserves_the_organizer() {
  let o = office().await;
  let w = window(at(18, 0), at(18, 30));

  let meeting = o.store.create_meeting(o.manager.profile_id, w).await.unwrap();
  assert_eq!(meeting.organizer_id, o.manager.profile_id);
  assert!(meeting.participants.is_empty());

  let entries = o.store.calendar(o.manager.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].reservation, Reservation::Meeting(meeting.meeting_id));
  assert_eq!(entries[0].window, w);
}

#[tokio::test]
async fn overlapping_meeting_for_busy_organizer_changes_nothing() {
  let o = office().await;
  o.store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();

  let err = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 10), at(18, 20)))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(CoreError::Busy { owner, .. }) if owner == o.manager.profile_id),
    "{err:?}"
  );

  assert_eq!(o.store.list_meetings(o.manager.profile_id).await.unwrap().len(), 1);
  assert_eq!(o.store.calendar(o.manager.profile_id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn back_to_back_meetings_do_not_conflict() {
  let o = office().await;
  o.store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  o.store
    .create_meeting(o.manager.profile_id, window(at(18, 30), at(19, 0)))
    .await
    .unwrap();
  o.store
    .create_meeting(o.manager.profile_id, window(at(17, 0), at(18, 0)))
    .await
    .unwrap();
  assert_eq!(o.store.calendar(o.manager.profile_id, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn participant_gets_an_entry_and_sees_the_meeting() {
  let o = office().await;
  let w = window(at(18, 0), at(18, 30));
  let meeting = o.store.create_meeting(o.manager.profile_id, w).await.unwrap();

  let meeting = o
    .store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();
  assert_eq!(meeting.participants, vec![o.employee.profile_id]);

  let entries = o.store.calendar(o.employee.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].window, w);

  let listed = o.store.list_meetings(o.employee.profile_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].meeting_id, meeting.meeting_id);

  let fetched = o.store.get_meeting(meeting.meeting_id).await.unwrap().unwrap();
  assert_eq!(fetched, meeting);
}

#[tokio::test]
async fn busy_participant_cannot_be_double_booked() {
  let o = office().await;
  let colleague = o.store.set_authority(o.colleague.profile_id, Authority::Manager).await.unwrap();

  let first = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  o.store
    .add_participant(o.manager.profile_id, first.meeting_id, "egor".into())
    .await
    .unwrap();

  let second = o
    .store
    .create_meeting(colleague.profile_id, window(at(18, 15), at(19, 0)))
    .await
    .unwrap();
  let err = o
    .store
    .add_participant(colleague.profile_id, second.meeting_id, "egor".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Busy { .. })), "{err:?}");

  let entries = o.store.calendar(o.employee.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].reservation, Reservation::Meeting(first.meeting_id));
  let second = o.store.get_meeting(second.meeting_id).await.unwrap().unwrap();
  assert!(second.participants.is_empty());
}

#[tokio::test]
async fn cross_team_participant_is_rejected() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();

  let err = o
    .store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "xena".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CrossTeam(..))), "{err:?}");

  assert!(o.store.calendar(o.outsider.profile_id, None).await.unwrap().is_empty());
  let meeting = o.store.get_meeting(meeting.meeting_id).await.unwrap().unwrap();
  assert!(meeting.participants.is_empty());
}

#[tokio::test]
async fn company_less_profiles_are_never_teammates() {
  let s = store().await;
  let boss = s.bootstrap_administrator("root".into()).await.unwrap().profile;
  join(&s, "drifter", None).await;
  let meeting = s
    .create_meeting(boss.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();

  let err = s
    .add_participant(boss.profile_id, meeting.meeting_id, "drifter".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CrossTeam(..))), "{err:?}");
}

#[tokio::test]
async fn re_adding_an_attendee_is_a_duplicate() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  o.store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();

  for name in ["egor", "olga"] {
    let err = o
      .store
      .add_participant(o.manager.profile_id, meeting.meeting_id, name.into())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::Duplicate(_))), "{name}: {err:?}");
  }
  assert_eq!(o.store.calendar(o.employee.profile_id, None).await.unwrap().len(), 1);
  assert_eq!(o.store.calendar(o.manager.profile_id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_participant_or_meeting_is_not_found() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();

  let err = o
    .store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "ghost".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");

  let err = o
    .store
    .add_participant(o.manager.profile_id, Uuid::new_v4(), "egor".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");
}

#[tokio::test]
async fn only_the_organizer_manages_a_meeting() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();

  let err = o
    .store
    .add_participant(o.employee.profile_id, meeting.meeting_id, "anna".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");

  let err = o
    .store
    .cancel_meeting(o.employee.profile_id, meeting.meeting_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");
  assert!(o.store.get_meeting(meeting.meeting_id).await.unwrap().is_some());
}

#[tokio::test]
async fn removing_a_participant_releases_their_entry() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  o.store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();

  let meeting = o
    .store
    .remove_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();
  assert!(meeting.participants.is_empty());
  assert!(o.store.calendar(o.employee.profile_id, None).await.unwrap().is_empty());

  let err = o
    .store
    .remove_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");

  let err = o
    .store
    .remove_participant(o.manager.profile_id, meeting.meeting_id, "olga".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Validation { .. })), "{err:?}");
}

#[tokio::test]
async fn cancelling_a_meeting_releases_every_entry() {
  let o = office().await;
  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  for name in ["egor", "anna"] {
    o.store
      .add_participant(o.manager.profile_id, meeting.meeting_id, name.into())
      .await
      .unwrap();
  }
  let reservation = Reservation::Meeting(meeting.meeting_id);
  assert_eq!(o.store.reservation_entries(reservation).await.unwrap().len(), 3);

  o.store.cancel_meeting(o.manager.profile_id, meeting.meeting_id).await.unwrap();

  assert!(o.store.get_meeting(meeting.meeting_id).await.unwrap().is_none());
  assert!(o.store.reservation_entries(reservation).await.unwrap().is_empty());
  assert!(o.store.calendar(o.manager.profile_id, None).await.unwrap().is_empty());

  let err = o
    .store
    .cancel_meeting(o.manager.profile_id, meeting.meeting_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");

  // The slot is free again.
  o.store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
}

#[tokio::test]
async fn availability_reflects_meetings_only() {
  let o = office().await;
  o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  let w = window(at(18, 0), at(18, 30));
  assert!(o.store.is_free(o.employee.profile_id, w).await.unwrap());

  let meeting = o.store.create_meeting(o.manager.profile_id, w).await.unwrap();
  o.store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();
  assert!(!o.store.is_free(o.employee.profile_id, window(at(18, 29), at(19, 0))).await.unwrap());
  assert!(o.store.is_free(o.employee.profile_id, window(at(18, 30), at(19, 0))).await.unwrap());
}

#[tokio::test]
async fn calendar_can_be_restricted_to_a_window() {
  let o = office().await;
  o.store
    .create_meeting(o.manager.profile_id, window(at(10, 0), at(11, 0)))
    .await
    .unwrap();
  o.store
    .create_meeting(o.manager.profile_id, window(at(15, 0), at(16, 0)))
    .await
    .unwrap();

  let morning = o
    .store
    .calendar(o.manager.profile_id, Some(window(at(9, 0), at(12, 0))))
    .await
    .unwrap();
  assert_eq!(morning.len(), 1);
  assert_eq!(morning[0].window.start, at(10, 0));
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn task_reserves_the_executor_until_the_deadline() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  assert_eq!(task.created_at, now());
  assert_eq!(task.assigned_by, o.manager.profile_id);

  let entries = o.store.calendar(o.employee.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].reservation, Reservation::Task(task.task_id));
  assert_eq!(entries[0].window, window(now(), deadline()));

  let status = o.store.task_status(task.task_id).await.unwrap().unwrap();
  assert_eq!(status.status, Status::Pending);
  assert_eq!(status.comment, "");
}

#[tokio::test]
async fn task_across_companies_is_rejected() {
  let o = office().await;
  let err = o
    .store
    .create_task(o.manager.profile_id, t1(&o.outsider))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CrossTeam(..))), "{err:?}");
  assert!(o.store.list_tasks(o.outsider.profile_id).await.unwrap().is_empty());
  assert!(o.store.calendar(o.outsider.profile_id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn task_validation_failures() {
  let o = office().await;

  let mut past = t1(&o.employee);
  past.deadline = now();
  let err = o.store.create_task(o.manager.profile_id, past).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Validation { field: "deadline", .. })));

  let mut ghost = t1(&o.employee);
  ghost.assigned_to = Uuid::new_v4();
  let err = o.store.create_task(o.manager.profile_id, ghost).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");

  assert!(o.store.list_tasks(o.manager.profile_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn task_reservation_never_blocks_a_meeting() {
  let o = office().await;
  o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let meeting = o
    .store
    .create_meeting(o.manager.profile_id, window(at(18, 0), at(18, 30)))
    .await
    .unwrap();
  o.store
    .add_participant(o.manager.profile_id, meeting.meeting_id, "egor".into())
    .await
    .unwrap();
  assert_eq!(o.store.calendar(o.employee.profile_id, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn reassigning_to_the_same_executor_keeps_one_entry() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let patch = TaskPatch { assigned_to: Some(o.employee.profile_id), ..Default::default() };
  o.store.update_task(o.manager.profile_id, task.task_id, patch).await.unwrap();

  let entries = o.store.reservation_entries(task.reservation()).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].owner_id, o.employee.profile_id);
}

#[tokio::test]
async fn reassignment_moves_the_reservation() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let new_deadline = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
  let patch = TaskPatch {
    assigned_to: Some(o.colleague.profile_id),
    deadline: Some(new_deadline),
    ..Default::default()
  };
  let updated = o.store.update_task(o.manager.profile_id, task.task_id, patch).await.unwrap();
  assert_eq!(updated.assigned_to, o.colleague.profile_id);
  assert_eq!(updated.name, "T1");
  assert_eq!(updated.created_at, task.created_at);

  assert!(o.store.calendar(o.employee.profile_id, None).await.unwrap().is_empty());
  let entries = o.store.calendar(o.colleague.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].window, window(now(), new_deadline));

  let fetched = o.store.get_task(task.task_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn partial_update_keeps_unsupplied_fields() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let patch = TaskPatch { name: Some("T1 revised".into()), ..Default::default() };
  let updated = o.store.update_task(o.manager.profile_id, task.task_id, patch).await.unwrap();
  assert_eq!(updated.name, "T1 revised");
  assert_eq!(updated.assigned_to, task.assigned_to);
  assert_eq!(updated.deadline, task.deadline);

  let entries = o.store.reservation_entries(task.reservation()).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].window, window(now(), deadline()));
}

#[tokio::test]
async fn cross_team_reassignment_is_rolled_back() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let patch = TaskPatch {
    name: Some("renamed".into()),
    assigned_to: Some(o.outsider.profile_id),
    ..Default::default()
  };
  let err = o
    .store
    .update_task(o.manager.profile_id, task.task_id, patch)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CrossTeam(..))), "{err:?}");

  let fetched = o.store.get_task(task.task_id).await.unwrap().unwrap();
  assert_eq!(fetched, task);
  assert_eq!(o.store.calendar(o.employee.profile_id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_assignor_updates_or_deletes() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let patch = TaskPatch { name: Some("mine now".into()), ..Default::default() };
  let err = o
    .store
    .update_task(o.employee.profile_id, task.task_id, patch)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");

  let err = o.store.delete_task(o.employee.profile_id, task.task_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");
}

#[tokio::test]
async fn deleting_a_task_removes_its_entry_and_status() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  o.store.delete_task(o.manager.profile_id, task.task_id).await.unwrap();

  assert!(o.store.get_task(task.task_id).await.unwrap().is_none());
  assert!(o.store.task_status(task.task_id).await.unwrap().is_none());
  assert!(o.store.reservation_entries(task.reservation()).await.unwrap().is_empty());

  let err = o.store.delete_task(o.manager.profile_id, task.task_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })), "{err:?}");
}

#[tokio::test]
async fn only_the_executor_reports_progress() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();

  let update = StatusUpdate { status: Status::Finished, comment: "done".into() };
  let err = o
    .store
    .update_task_status(o.manager.profile_id, task.task_id, update.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");

  let status = o
    .store
    .update_task_status(o.employee.profile_id, task.task_id, update)
    .await
    .unwrap();
  assert_eq!(status.status, Status::Finished);

  let stored = o.store.task_status(task.task_id).await.unwrap().unwrap();
  assert_eq!(stored, status);
}

#[tokio::test]
async fn overlong_status_comment_is_rejected() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  let update = StatusUpdate { status: Status::Deferred, comment: "x".repeat(129) };
  let err = o
    .store
    .update_task_status(o.employee.profile_id, task.task_id, update)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Validation { field: "comment", .. })));
}

#[tokio::test]
async fn executor_cannot_estimate_their_own_task() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  let marks = EstimationInput { deadline_meeting: 8, completeness: 9, quality: 7 }
    .validate()
    .unwrap();

  let err = o
    .store
    .estimate_task(o.employee.profile_id, task.task_id, marks)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Forbidden(_))), "{err:?}");
  assert!(o.store.list_estimations(o.employee.profile_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn a_task_is_estimated_once() {
  let o = office().await;
  let task = o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  let marks = EstimationInput { deadline_meeting: 8, completeness: 9, quality: 7 }
    .validate()
    .unwrap();

  let estimation = o
    .store
    .estimate_task(o.manager.profile_id, task.task_id, marks)
    .await
    .unwrap();
  assert_eq!(estimation.quality.get(), 7);

  let err = o
    .store
    .estimate_task(o.manager.profile_id, task.task_id, marks)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate(_))), "{err:?}");

  let listed = o.store.list_estimations(o.employee.profile_id).await.unwrap();
  assert_eq!(listed, vec![estimation]);
}

#[tokio::test]
async fn tasks_are_listed_for_both_ends() {
  let o = office().await;
  o.store.create_task(o.manager.profile_id, t1(&o.employee)).await.unwrap();
  o.store.create_task(o.manager.profile_id, t1(&o.colleague)).await.unwrap();

  assert_eq!(o.store.list_tasks(o.manager.profile_id).await.unwrap().len(), 2);
  assert_eq!(o.store.list_tasks(o.employee.profile_id).await.unwrap().len(), 1);
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn wall_clock_timestamps_are_stored_exactly() {
  let o = staff(SqliteStore::open_in_memory().await.unwrap()).await;
  let input = NewTask {
    name:        "T1".into(),
    assigned_to: o.employee.profile_id,
    deadline:    Utc::now() + TimeDelta::days(7) + TimeDelta::nanoseconds(123),
  };
  let task = o.store.create_task(o.manager.profile_id, input).await.unwrap();

  assert_eq!(o.store.get_task(task.task_id).await.unwrap().unwrap(), task);
  let entries = o.store.calendar(o.employee.profile_id, None).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].window.start, task.created_at);
  assert_eq!(entries[0].window, task.window().unwrap());

  let status = o.store.task_status(task.task_id).await.unwrap().unwrap();
  assert_eq!(status.updated_at, task.created_at);
}

#[tokio::test]
async fn sub_microsecond_windows_keep_their_bounds() {
  let o = office().await;
  let ns = TimeDelta::nanoseconds;
  let base = at(18, 0);

  let narrow = window(base + ns(100), base + ns(900));
  let meeting = o.store.create_meeting(o.manager.profile_id, narrow).await.unwrap();
  assert_eq!(o.store.get_meeting(meeting.meeting_id).await.unwrap().unwrap(), meeting);

  let err = o
    .store
    .create_meeting(o.manager.profile_id, window(base + ns(500), at(18, 30)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Busy { .. })), "{err:?}");

  let next = o
    .store
    .create_meeting(o.manager.profile_id, window(base + ns(900), at(18, 30)))
    .await
    .unwrap();
  assert_eq!(o.store.get_meeting(next.meeting_id).await.unwrap().unwrap(), next);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_meetings_book_the_organizer_once() {
  let o = office().await;
  let organizer = o.manager.profile_id;

  let handles = (0..20)
    .map(|i| {
      let store = o.store.clone();
      let slot = window(at(18, 0), at(18, 30 + i % 10));
      tokio::spawn(async move { store.create_meeting(organizer, slot).await })
    })
    .collect::<Vec<_>>();

  let mut booked = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => booked += 1,
      Err(err) => assert!(matches!(err, Error::Core(CoreError::Busy { .. })), "{err:?}"),
    }
  }
  assert_eq!(booked, 1);
  assert_eq!(o.store.calendar(organizer, None).await.unwrap().len(), 1);
  assert_eq!(o.store.list_meetings(organizer).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invitations_book_a_participant_once() {
  let o = office().await;
  let mut meetings = Vec::new();
  for i in 0..8 {
    let organizer = join(&o.store, &format!("organizer{i}"), o.employee.company_id).await;
    let slot = window(at(18, i), at(19, 0));
    let meeting = o.store.create_meeting(organizer.profile_id, slot).await.unwrap();
    meetings.push((organizer.profile_id, meeting.meeting_id));
  }

  let handles = meetings
    .into_iter()
    .map(|(organizer, meeting_id)| {
      let store = o.store.clone();
      tokio::spawn(async move { store.add_participant(organizer, meeting_id, "egor".into()).await })
    })
    .collect::<Vec<_>>();

  let mut added = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => added += 1,
      Err(err) => assert!(matches!(err, Error::Core(CoreError::Busy { .. })), "{err:?}"),
    }
  }
  assert_eq!(added, 1);
  assert_eq!(o.store.calendar(o.employee.profile_id, None).await.unwrap().len(), 1);
  assert_eq!(o.store.list_meetings(o.employee.profile_id).await.unwrap().len(), 1);
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[test]
fn moving_a_task_restores_a_missing_entry() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(SCHEMA).unwrap();
  let acme = directory::create_company(&conn, "Acme".into(), now()).unwrap();
  let hire = |username: &str| {
    let input = NewProfile { username: username.into(), company_id: Some(acme.company_id) };
    directory::insert_profile(&conn, input, Authority::Employee, false, now()).unwrap().profile
  };
  let manager = hire("olga");
  let employee = hire("egor");
  let colleague = hire("anna");

  let task = tasks::create(&conn, manager.profile_id, t1(&employee), now()).unwrap();
  assert_eq!(calendar::delete_all(&conn, task.reservation()).unwrap(), 1);

  let patch = TaskPatch { assigned_to: Some(colleague.profile_id), ..Default::default() };
  let next = tasks::update(&conn, manager.profile_id, task.task_id, &patch).unwrap();

  let entries = calendar::entries_of(&conn, task.reservation()).unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].owner_id, colleague.profile_id);
  assert_eq!(entries[0].window, next.window().unwrap());
}
