//! Measurement Repository

use super::{RepoError, RepoResult};
use shared::models::Measurement;
use sqlx::SqlitePool;

const MEASUREMENT_SELECT: &str =
    "SELECT id, tenant_id, member_id, date, weight, waist, hip, chest FROM measurement";

/// A member's measurements, newest first
pub async fn find_by_member(
    pool: &SqlitePool,
    tenant_id: i64,
    member_id: i64,
) -> RepoResult<Vec<Measurement>> {
    let sql = format!(
        "{} WHERE tenant_id = ? AND member_id = ? ORDER BY date DESC",
        MEASUREMENT_SELECT
    );
    let rows = sqlx::query_as::<_, Measurement>(&sql)
        .bind(tenant_id)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    member_id: i64,
    date: &str,
    weight: f64,
    waist: Option<f64>,
    hip: Option<f64>,
    chest: Option<f64>,
) -> RepoResult<Measurement> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO measurement (id, tenant_id, member_id, date, weight, waist, hip, chest) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(member_id)
    .bind(date)
    .bind(weight)
    .bind(waist)
    .bind(hip)
    .bind(chest)
    .execute(pool)
    .await?;

    let sql = format!("{} WHERE id = ?", MEASUREMENT_SELECT);
    sqlx::query_as::<_, Measurement>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create measurement".into()))
}

pub async fn delete(pool: &SqlitePool, tenant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM measurement WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
