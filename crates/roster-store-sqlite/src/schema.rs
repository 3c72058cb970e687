//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS companies (
    company_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    profile_id        TEXT PRIMARY KEY,
    username          TEXT NOT NULL UNIQUE,
    company_id        TEXT REFERENCES companies(company_id),
    authority         TEXT NOT NULL DEFAULT 'EMPLOYEE',  -- EMPLOYEE | MANAGER | BOSS
    is_administrator  INTEGER NOT NULL DEFAULT 0,
    api_token         TEXT NOT NULL UNIQUE,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meetings (
    meeting_id    TEXT PRIMARY KEY,
    organizer_id  TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    start_at      TEXT NOT NULL,
    end_at        TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    CHECK (start_at < end_at)
);

CREATE TABLE IF NOT EXISTS meeting_participants (
    meeting_id  TEXT NOT NULL REFERENCES meetings(meeting_id) ON DELETE CASCADE,
    profile_id  TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    added_at    TEXT NOT NULL,
    PRIMARY KEY (meeting_id, profile_id)
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id      TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    assigned_by  TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    assigned_to  TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    deadline     TEXT NOT NULL,
    CHECK (created_at < deadline)
);

-- Exactly one per task, updated in place.
CREATE TABLE IF NOT EXISTS task_statuses (
    task_id     TEXT PRIMARY KEY REFERENCES tasks(task_id) ON DELETE CASCADE,
    status      TEXT NOT NULL DEFAULT 'PENDING',  -- PENDING | DEFERRED | FINISHED
    comment     TEXT NOT NULL DEFAULT '',
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_estimations (
    estimation_id     TEXT PRIMARY KEY,
    task_id           TEXT NOT NULL UNIQUE REFERENCES tasks(task_id) ON DELETE CASCADE,
    created_at        TEXT NOT NULL,
    deadline_meeting  INTEGER NOT NULL CHECK (deadline_meeting BETWEEN 1 AND 10),
    completeness      INTEGER NOT NULL CHECK (completeness BETWEEN 1 AND 10),
    quality           INTEGER NOT NULL CHECK (quality BETWEEN 1 AND 10)
);

-- Each entry belongs to exactly one meeting or one task and disappears
-- with it.
CREATE TABLE IF NOT EXISTS calendar_entries (
    entry_id    TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    meeting_id  TEXT REFERENCES meetings(meeting_id) ON DELETE CASCADE,
    task_id     TEXT REFERENCES tasks(task_id) ON DELETE CASCADE,
    start_at    TEXT NOT NULL,
    end_at      TEXT NOT NULL,
    CHECK  ((meeting_id IS NULL) != (task_id IS NULL)),
    CHECK  (start_at < end_at),
    UNIQUE (owner_id, meeting_id),
    UNIQUE (task_id)
);

CREATE INDEX IF NOT EXISTS calendar_owner_idx   ON calendar_entries(owner_id, start_at);
CREATE INDEX IF NOT EXISTS calendar_meeting_idx ON calendar_entries(meeting_id);
CREATE INDEX IF NOT EXISTS tasks_assignee_idx   ON tasks(assigned_to);
CREATE INDEX IF NOT EXISTS tasks_assignor_idx   ON tasks(assigned_by);

PRAGMA user_version = 1;
";
