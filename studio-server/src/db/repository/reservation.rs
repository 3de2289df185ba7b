//! Reservation Repository

use super::{RepoError, RepoResult};
use shared::models::{CancelStatus, Reservation, ReservationStatus, ReservationWithSession};
use sqlx::{SqliteConnection, SqlitePool};

const RESERVATION_SELECT: &str = "SELECT id, tenant_id, member_id, session_id, status, cancel_status, cancel_reason, created_at, updated_at FROM reservation";

const WITH_SESSION_SELECT: &str = "SELECT r.id, r.member_id, r.session_id, r.status, r.cancel_status, r.cancel_reason, s.date AS session_date, s.time AS session_time, s.start_at AS session_start_at, s.notes AS session_notes, r.created_at
    FROM reservation r JOIN session s ON s.id = r.session_id";

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", RESERVATION_SELECT);
    let row = sqlx::query_as::<_, Reservation>(&sql)
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
) -> RepoResult<Option<Reservation>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", RESERVATION_SELECT);
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// A member's active reservations joined with session info, soonest first
pub async fn find_active_by_member(
    pool: &SqlitePool,
    tenant_id: i64,
    member_id: i64,
) -> RepoResult<Vec<ReservationWithSession>> {
    let sql = format!(
        "{} WHERE r.tenant_id = ? AND r.member_id = ? AND r.status = 'active' ORDER BY s.start_at ASC",
        WITH_SESSION_SELECT
    );
    let rows = sqlx::query_as::<_, ReservationWithSession>(&sql)
        .bind(tenant_id)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn exists_active(
    conn: &mut SqliteConnection,
    member_id: i64,
    session_id: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservation WHERE member_id = ? AND session_id = ? AND status = 'active'",
    )
    .bind(member_id)
    .bind(session_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

/// Insert a new active reservation.
///
/// The partial unique index on (member_id, session_id) WHERE status='active'
/// turns a double-book into `RepoError::Duplicate`.
pub async fn insert_active(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    member_id: i64,
    session_id: i64,
    now_ms: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO reservation (id, tenant_id, member_id, session_id, status, cancel_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'active', 'none', ?5, ?5)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(member_id)
    .bind(session_id)
    .bind(now_ms)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: ReservationStatus,
    now_ms: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE reservation SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_ms)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {id} not found")));
    }
    Ok(())
}

/// Store a cancellation request (pending + reason)
pub async fn set_cancel_request(
    conn: &mut SqliteConnection,
    id: i64,
    reason: &str,
    now_ms: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE reservation SET cancel_status = 'pending', cancel_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(reason)
    .bind(now_ms)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn set_cancel_status(
    conn: &mut SqliteConnection,
    id: i64,
    cancel_status: CancelStatus,
    now_ms: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE reservation SET cancel_status = ?, updated_at = ? WHERE id = ?")
        .bind(cancel_status)
        .bind(now_ms)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Pending cancellation requests for the admin queue
pub async fn find_pending_cancel(
    pool: &SqlitePool,
    tenant_id: i64,
) -> RepoResult<Vec<ReservationWithSession>> {
    let sql = format!(
        "{} WHERE r.tenant_id = ? AND r.cancel_status = 'pending' ORDER BY r.updated_at ASC",
        WITH_SESSION_SELECT
    );
    let rows = sqlx::query_as::<_, ReservationWithSession>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active reservations on a session (sweep input, inside the sweep tx)
pub async fn find_active_by_session(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "{} WHERE session_id = ? AND status = 'active'",
        RESERVATION_SELECT
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(session_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// All reservations on a session (session delete path, inside its tx)
pub async fn find_by_session(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!("{} WHERE session_id = ?", RESERVATION_SELECT);
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(session_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
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
        sqlx::query(
            "INSERT INTO member (id, tenant_id, full_name, credits, created_at) VALUES (10, 1, 'Ada', 3, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO session (id, tenant_id, date, time, start_at, capacity, spots_left, completed) VALUES (20, 1, '2026-03-02', '10:00', 1000, 4, 4, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn second_active_reservation_for_same_pair_is_rejected() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        insert_active(&mut conn, 1, 10, 20, 0).await.unwrap();
        let err = insert_active(&mut conn, 1, 10, 20, 0).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn canceled_reservation_frees_the_unique_slot() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let id = insert_active(&mut conn, 1, 10, 20, 0).await.unwrap();
        set_status(&mut conn, id, ReservationStatus::Canceled, 1).await.unwrap();

        // A fresh active reservation on the same pair is allowed again
        insert_active(&mut conn, 1, 10, 20, 2).await.unwrap();
    }
}
