//! Schema bootstrap
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` statements run at startup (and by
//! every test against an in-memory pool). The CHECK constraints and the
//! partial unique index are load-bearing:
//!
//! - `0 <= spots_left <= capacity` can never be violated, even by a buggy
//!   caller — the conditional claim/release updates rely on it as a backstop.
//! - at most one `active` reservation per (member, session) is a database
//!   invariant, not a convention.

use sqlx::SqlitePool;

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tenant (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        domain_prefix TEXT NOT NULL UNIQUE,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS member (
        id INTEGER PRIMARY KEY,
        tenant_id INTEGER NOT NULL REFERENCES tenant(id),
        full_name TEXT NOT NULL COLLATE NOCASE,
        credits INTEGER NOT NULL DEFAULT 0 CHECK (credits >= 0),
        created_at INTEGER NOT NULL,
        UNIQUE (tenant_id, full_name)
    )",
    "CREATE TABLE IF NOT EXISTS session (
        id INTEGER PRIMARY KEY,
        tenant_id INTEGER NOT NULL REFERENCES tenant(id),
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        start_at INTEGER NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity >= 0),
        spots_left INTEGER NOT NULL CHECK (spots_left >= 0 AND spots_left <= capacity),
        notes TEXT,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recur_group_id TEXT,
        completed INTEGER NOT NULL DEFAULT 0,
        is_reserved INTEGER NOT NULL DEFAULT 0,
        UNIQUE (tenant_id, date, time)
    )",
    "CREATE TABLE IF NOT EXISTS reservation (
        id INTEGER PRIMARY KEY,
        tenant_id INTEGER NOT NULL REFERENCES tenant(id),
        member_id INTEGER NOT NULL REFERENCES member(id) ON DELETE CASCADE,
        session_id INTEGER NOT NULL REFERENCES session(id) ON DELETE CASCADE,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'canceled', 'moved', 'attended', 'no_show')),
        cancel_status TEXT NOT NULL DEFAULT 'none'
            CHECK (cancel_status IN ('none', 'pending', 'approved', 'rejected')),
        cancel_reason TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS measurement (
        id INTEGER PRIMARY KEY,
        tenant_id INTEGER NOT NULL REFERENCES tenant(id),
        member_id INTEGER NOT NULL REFERENCES member(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        weight REAL NOT NULL,
        waist REAL,
        hip REAL,
        chest REAL
    )",
];

const INDEXES: &[&str] = &[
    // The single-active invariant
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_reservation_active
        ON reservation (member_id, session_id) WHERE status = 'active'",
    "CREATE INDEX IF NOT EXISTS idx_session_open
        ON reservation (session_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_session_start
        ON session (tenant_id, completed, start_at)",
    "CREATE INDEX IF NOT EXISTS idx_reservation_member
        ON reservation (tenant_id, member_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_measurement_member
        ON measurement (member_id, date)",
];

/// Create all tables and indexes if missing
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in TABLES.iter().chain(INDEXES) {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
