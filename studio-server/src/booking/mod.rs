//! 预约核心
//!
//! The booking core owns all business rules: the reservation state machine
//! (`engine`), the sweep that closes elapsed sessions (`sweep`), the member
//! roster and credit ledger (`ledger`) and the session catalog (`catalog`).
//! Every operation is tenant-scoped through an explicit [`Actor`] and takes
//! the current time as an argument; the HTTP layer above supplies both.

pub mod actor;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod sweep;

pub use actor::{Actor, Role};
pub use error::{BookingError, BookingResult};
pub use sweep::{SweepReport, SweepScheduler, run_sweep};

/// 测试夹具：单连接内存库 + 种子租户
#[cfg(test)]
pub(crate) mod harness {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::db::schema;

    pub const TENANT: i64 = 1;
    pub const HOUR_MS: i64 = 60 * 60 * 1000;

    /// In-memory pool capped at one connection so every query sees the same
    /// database.
    pub async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO tenant (id, name, domain_prefix, is_active, created_at) VALUES (1, 'Studio', 'studio', 1, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    pub async fn member(pool: &SqlitePool, name: &str, credits: i64) -> i64 {
        crate::db::repository::member::create(pool, TENANT, name, credits)
            .await
            .unwrap()
            .id
    }

    /// Session on a fixed date starting `start_at` millis from the epoch the
    /// tests treat as "now = 0". Callers vary `time` to dodge the per-slot
    /// uniqueness constraint.
    pub async fn session(pool: &SqlitePool, time: &str, start_at: i64, capacity: i64) -> i64 {
        crate::db::repository::session::create(
            pool,
            TENANT,
            "2026-03-02",
            time,
            start_at,
            capacity,
            None,
            None,
            false,
        )
        .await
        .unwrap()
        .id
    }

    pub async fn complete_session(pool: &SqlitePool, session_id: i64) {
        sqlx::query("UPDATE session SET completed = 1 WHERE id = ?")
            .bind(session_id)
            .execute(pool)
            .await
            .unwrap();
    }
}
