//! SQL schema for the aerosafe SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Enumerations are stored as snake_case text, timestamps as fixed-width
/// RFC 3339 UTC strings (so text order is time order) and dates as
/// `YYYY-MM-DD`. References to users are weak: actor ids come from the
/// identity provider and need not have a profile row.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id  TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    full_name   TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'reporter',
    position    TEXT,
    phone       TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS aircraft (
    aircraft_id   TEXT PRIMARY KEY,
    registration  TEXT NOT NULL UNIQUE,
    aircraft_type TEXT NOT NULL,
    model         TEXT NOT NULL,
    year          INTEGER,
    status        TEXT NOT NULL DEFAULT 'active',
    notes         TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Occurrences are never deleted; invalid ones are closed instead.
CREATE TABLE IF NOT EXISTS occurrences (
    occurrence_id      TEXT PRIMARY KEY,
    title              TEXT NOT NULL,
    occurred_at        TEXT NOT NULL,
    location           TEXT NOT NULL,
    occurrence_type    TEXT NOT NULL,
    severity           TEXT NOT NULL DEFAULT 'medium',
    status             TEXT NOT NULL DEFAULT 'reported',
    description        TEXT NOT NULL,
    aircraft_id        TEXT,
    reporter_id        TEXT NOT NULL,
    assigned_to        TEXT,
    weather_conditions TEXT,
    flight_phase       TEXT,
    immediate_actions  TEXT,
    is_invalid         INTEGER NOT NULL DEFAULT 0,
    invalid_reason     TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- At most one investigation per occurrence.
CREATE TABLE IF NOT EXISTS investigations (
    investigation_id     TEXT PRIMARY KEY,
    occurrence_id        TEXT NOT NULL UNIQUE REFERENCES occurrences(occurrence_id),
    lead_investigator_id TEXT,
    stage                TEXT NOT NULL DEFAULT 'not_started',
    findings             TEXT,
    root_causes          TEXT,
    contributing_factors TEXT,
    recommendations      TEXT,
    started_at           TEXT,
    completed_at         TEXT,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL,
    CHECK ((stage = 'completed') = (completed_at IS NOT NULL))
);

-- Append-only progress notes.
CREATE TABLE IF NOT EXISTS investigation_updates (
    update_id        TEXT PRIMARY KEY,
    investigation_id TEXT NOT NULL
                     REFERENCES investigations(investigation_id) ON DELETE CASCADE,
    author_id        TEXT NOT NULL,
    note             TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS corrective_actions (
    action_id        TEXT PRIMARY KEY,
    investigation_id TEXT NOT NULL
                     REFERENCES investigations(investigation_id) ON DELETE CASCADE,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL,
    assigned_to      TEXT,
    status           TEXT NOT NULL DEFAULT 'pending',
    due_date         TEXT,
    completed_at     TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trailers (
    trailer_id    TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    max_capacity  INTEGER NOT NULL CHECK (max_capacity > 0),
    current_fuel  INTEGER NOT NULL DEFAULT 0
                  CHECK (current_fuel BETWEEN 0 AND max_capacity),
    last_refilled TEXT,
    status        TEXT NOT NULL DEFAULT 'available',
    location      TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS occurrences_status_idx   ON occurrences(status);
CREATE INDEX IF NOT EXISTS occurrences_created_idx  ON occurrences(created_at);
CREATE INDEX IF NOT EXISTS occurrences_aircraft_idx ON occurrences(aircraft_id);
CREATE INDEX IF NOT EXISTS investigations_stage_idx ON investigations(stage);
CREATE INDEX IF NOT EXISTS updates_investigation_idx
    ON investigation_updates(investigation_id, created_at);
CREATE INDEX IF NOT EXISTS actions_investigation_idx
    ON corrective_actions(investigation_id);
CREATE INDEX IF NOT EXISTS actions_due_idx          ON corrective_actions(due_date);

PRAGMA user_version = 1;
";
