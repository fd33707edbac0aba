//! SQL schema for the potluck SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    slug        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    host_name   TEXT,
    created_at  TEXT NOT NULL     -- RFC 3339 UTC, fixed microsecond width
);

CREATE TABLE IF NOT EXISTS items (
    item_id       TEXT PRIMARY KEY,
    event_id      TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    label         TEXT NOT NULL,
    requested_qty INTEGER NOT NULL CHECK (requested_qty >= 1),
    created_by    TEXT NOT NULL DEFAULT '',
    created_at    TEXT NOT NULL
);

-- Several rows may exist per (item_id, claimer_name); they are never merged.
CREATE TABLE IF NOT EXISTS claims (
    claim_id      TEXT PRIMARY KEY,
    item_id       TEXT NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
    claimer_name  TEXT NOT NULL,
    qty           INTEGER NOT NULL CHECK (qty >= 1),
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id  TEXT PRIMARY KEY,
    name        TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_created_idx ON events(created_at);
CREATE INDEX IF NOT EXISTS items_event_idx    ON items(event_id, created_at);
CREATE INDEX IF NOT EXISTS claims_item_idx    ON claims(item_id, claimer_name, created_at);

PRAGMA user_version = 1;
";
