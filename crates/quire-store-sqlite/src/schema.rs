//! SQL schema for the Quire SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version` for future migrations to key off.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    organization_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL UNIQUE,
    created_at      TEXT NOT NULL    -- RFC 3339 UTC, microseconds
);

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL
                    REFERENCES organizations(organization_id) ON DELETE CASCADE,
    email           TEXT NOT NULL,
    name            TEXT NOT NULL,
    role            TEXT NOT NULL CHECK (role IN ('reader', 'writer', 'admin')),
    created_at      TEXT NOT NULL,
    updated_at      TEXT,
    UNIQUE (organization_id, email),
    -- Parent key for notes.created_by; pins authors to the note's org.
    UNIQUE (organization_id, user_id)
);

CREATE TABLE IF NOT EXISTS notes (
    note_id         TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    created_by      TEXT NOT NULL,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT,
    FOREIGN KEY (organization_id, created_by)
        REFERENCES users(organization_id, user_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS notes_org_created_idx ON notes(organization_id, created_at);

PRAGMA user_version = 1;
";
