//! Member Repository
//!
//! Names are stored canonicalized (`shared::util::canonical_name`) and the
//! column is `COLLATE NOCASE`, so equality lookups and the per-tenant unique
//! constraint are case-insensitive without `lower()` gymnastics.

use super::{RepoError, RepoResult};
use shared::models::Member;
use sqlx::{SqliteConnection, SqlitePool};

const MEMBER_SELECT: &str =
    "SELECT id, tenant_id, full_name, credits, created_at FROM member";

pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Member>> {
    let sql = format!("{} WHERE tenant_id = ? ORDER BY full_name ASC", MEMBER_SELECT);
    let rows = sqlx::query_as::<_, Member>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", MEMBER_SELECT);
    let row = sqlx::query_as::<_, Member>(&sql)
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
) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", MEMBER_SELECT);
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Case-insensitive lookup by canonical name
pub async fn find_by_name(
    pool: &SqlitePool,
    tenant_id: i64,
    canonical: &str,
) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE tenant_id = ? AND full_name = ?", MEMBER_SELECT);
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(tenant_id)
        .bind(canonical)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a member. The caller must pass an already-canonicalized name and a
/// non-negative credit balance.
pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    canonical: &str,
    credits: i64,
) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO member (id, tenant_id, full_name, credits, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(canonical)
    .bind(credits)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Member already registered: {canonical}"))
        }
        other => other,
    })?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

/// Adjust credits by `delta`, flooring the balance at 0.
///
/// A delta that would push the balance negative truncates to 0 rather than
/// failing — the CHECK constraint never fires through this path.
pub async fn adjust_credits(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    delta: i64,
) -> RepoResult<Member> {
    let rows = sqlx::query(
        "UPDATE member SET credits = MAX(0, credits + ?1) WHERE tenant_id = ?2 AND id = ?3",
    )
    .bind(delta)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

/// Debit exactly one credit, only if the balance is positive.
///
/// Returns whether a credit was actually taken — the sweep records
/// attendance either way (the zero-credit "free ride" floor).
pub async fn debit_credit_if_positive(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE member SET credits = credits - 1 WHERE id = ? AND credits > 0")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Refund one credit (admin refund paths, attended-session deletes)
pub async fn refund_credit(conn: &mut SqliteConnection, member_id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE member SET credits = credits + 1 WHERE id = ?")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Delete a member with its measurements and reservations, in one
/// transaction.
pub async fn delete_cascade(pool: &SqlitePool, tenant_id: i64, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM measurement WHERE member_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM reservation WHERE member_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM member WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}
