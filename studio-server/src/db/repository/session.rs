//! Session Repository
//!
//! Capacity changes go through `claim_spot` / `release_spot` only. Both are
//! single conditional UPDATEs checked by rows-affected, so two concurrent
//! reservations can never take the same last spot (the overbooking race the
//! legacy system had).

use super::{RepoError, RepoResult};
use shared::models::{Session, SessionParticipant};
use sqlx::{SqliteConnection, SqlitePool};

const SESSION_SELECT: &str = "SELECT id, tenant_id, date, time, start_at, capacity, spots_left, notes, is_recurring, recur_group_id, completed, is_reserved FROM session";

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Session>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", SESSION_SELECT);
    let row = sqlx::query_as::<_, Session>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Transaction-scoped lookup (engine reads inside its own tx)
pub async fn load(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Session>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", SESSION_SELECT);
    let row = sqlx::query_as::<_, Session>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Upcoming (not yet completed) sessions, soonest first
pub async fn find_upcoming(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Session>> {
    let sql = format!(
        "{} WHERE tenant_id = ? AND completed = 0 ORDER BY start_at ASC",
        SESSION_SELECT
    );
    let rows = sqlx::query_as::<_, Session>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Completed sessions, newest first
pub async fn find_completed(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Session>> {
    let sql = format!(
        "{} WHERE tenant_id = ? AND completed = 1 ORDER BY start_at DESC",
        SESSION_SELECT
    );
    let rows = sqlx::query_as::<_, Session>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn exists_at(
    pool: &SqlitePool,
    tenant_id: i64,
    date: &str,
    time: &str,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM session WHERE tenant_id = ? AND date = ? AND time = ?",
    )
    .bind(tenant_id)
    .bind(date)
    .bind(time)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    date: &str,
    time: &str,
    start_at: i64,
    capacity: i64,
    notes: Option<&str>,
    recur_group_id: Option<&str>,
    is_reserved: bool,
) -> RepoResult<Session> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO session (id, tenant_id, date, time, start_at, capacity, spots_left, notes, is_recurring, recur_group_id, completed, is_reserved) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8, ?9, 0, ?10)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(date)
    .bind(time)
    .bind(start_at)
    .bind(capacity)
    .bind(notes)
    .bind(recur_group_id.is_some())
    .bind(recur_group_id)
    .bind(is_reserved)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Session already scheduled at {date} {time}"))
        }
        other => other,
    })?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create session".into()))
}

/// Atomic check-and-decrement of `spots_left`.
///
/// Returns false when the session was already full — the caller turns that
/// into `SessionFull`.
pub async fn claim_spot(conn: &mut SqliteConnection, session_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE session SET spots_left = spots_left - 1 WHERE id = ? AND spots_left > 0",
    )
    .bind(session_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Give one spot back, bounded by capacity.
pub async fn release_spot(conn: &mut SqliteConnection, session_id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE session SET spots_left = spots_left + 1 WHERE id = ? AND spots_left < capacity",
    )
    .bind(session_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Sessions whose start has elapsed but are not yet completed (sweep input,
/// read inside the sweep transaction)
pub async fn find_elapsed_open(
    conn: &mut SqliteConnection,
    now_ms: i64,
) -> RepoResult<Vec<Session>> {
    let sql = format!(
        "{} WHERE completed = 0 AND start_at < ? ORDER BY start_at ASC",
        SESSION_SELECT
    );
    let rows = sqlx::query_as::<_, Session>(&sql)
        .bind(now_ms)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Flip `completed` exactly once; returns false if it already was.
pub async fn mark_completed(conn: &mut SqliteConnection, session_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE session SET completed = 1 WHERE id = ? AND completed = 0")
        .bind(session_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Participant list for the admin session detail view
pub async fn participants(
    pool: &SqlitePool,
    tenant_id: i64,
    session_id: i64,
) -> RepoResult<Vec<SessionParticipant>> {
    let rows = sqlx::query_as::<_, SessionParticipant>(
        "SELECT r.id AS reservation_id, r.member_id, m.full_name, r.status, r.cancel_status, r.created_at
         FROM reservation r JOIN member m ON m.id = r.member_id
         WHERE r.tenant_id = ? AND r.session_id = ?
         ORDER BY r.created_at ASC",
    )
    .bind(tenant_id)
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn delete(conn: &mut SqliteConnection, session_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM reservation WHERE session_id = ?")
        .bind(session_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM session WHERE id = ?")
        .bind(session_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
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

    #[tokio::test]
    async fn claim_spot_stops_at_zero() {
        let pool = test_pool().await;
        let s = create(&pool, 1, "2026-03-02", "10:00", 1_000, 2, None, None, false)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(claim_spot(&mut conn, s.id).await.unwrap());
        assert!(claim_spot(&mut conn, s.id).await.unwrap());
        assert!(!claim_spot(&mut conn, s.id).await.unwrap());
        drop(conn);

        let s = find_by_id(&pool, 1, s.id).await.unwrap().unwrap();
        assert_eq!(s.spots_left, 0);
    }

    #[tokio::test]
    async fn release_spot_never_exceeds_capacity() {
        let pool = test_pool().await;
        let s = create(&pool, 1, "2026-03-02", "10:00", 1_000, 2, None, None, false)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        release_spot(&mut conn, s.id).await.unwrap();
        drop(conn);
        let s = find_by_id(&pool, 1, s.id).await.unwrap().unwrap();
        assert_eq!(s.spots_left, 2);
    }

    #[tokio::test]
    async fn duplicate_slot_rejected_per_tenant() {
        let pool = test_pool().await;
        create(&pool, 1, "2026-03-02", "10:00", 1_000, 4, None, None, false)
            .await
            .unwrap();
        let err = create(&pool, 1, "2026-03-02", "10:00", 1_000, 4, None, None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn mark_completed_is_one_way() {
        let pool = test_pool().await;
        let s = create(&pool, 1, "2026-03-02", "10:00", 1_000, 4, None, None, false)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(mark_completed(&mut conn, s.id).await.unwrap());
        assert!(!mark_completed(&mut conn, s.id).await.unwrap());
    }
}
