//! Tenant Repository

use super::{RepoError, RepoResult};
use shared::models::{Tenant, TenantCreate};
use sqlx::SqlitePool;

const TENANT_SELECT: &str =
    "SELECT id, name, domain_prefix, is_active, created_at FROM tenant";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Tenant>> {
    let sql = format!("{} ORDER BY created_at DESC", TENANT_SELECT);
    let rows = sqlx::query_as::<_, Tenant>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Tenant>> {
    let sql = format!("{} WHERE id = ?", TENANT_SELECT);
    let row = sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_prefix(pool: &SqlitePool, prefix: &str) -> RepoResult<Option<Tenant>> {
    let sql = format!("{} WHERE domain_prefix = ?", TENANT_SELECT);
    let row = sqlx::query_as::<_, Tenant>(&sql)
        .bind(prefix)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: TenantCreate) -> RepoResult<Tenant> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO tenant (id, name, domain_prefix, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.domain_prefix)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Tenant name or prefix already in use: {}", data.name))
        }
        other => other,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tenant".into()))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Tenant> {
    let rows = sqlx::query("UPDATE tenant SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Tenant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Tenant {id} not found")))
}

/// Delete a tenant and every row it owns, in one transaction.
///
/// The schema has no tenant-level ON DELETE CASCADE; the cascade is spelled
/// out here so a partial delete can never leak orphan rows.
pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    for stmt in [
        "DELETE FROM reservation WHERE tenant_id = ?",
        "DELETE FROM measurement WHERE tenant_id = ?",
        "DELETE FROM session WHERE tenant_id = ?",
        "DELETE FROM member WHERE tenant_id = ?",
    ] {
        sqlx::query(stmt).bind(id).execute(&mut *tx).await?;
    }
    let rows = sqlx::query("DELETE FROM tenant WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
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
        pool
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_or_prefix() {
        let pool = test_pool().await;
        create(
            &pool,
            TenantCreate {
                name: "Studio A".into(),
                domain_prefix: "studio-a".into(),
            },
        )
        .await
        .unwrap();

        let err = create(
            &pool,
            TenantCreate {
                name: "Studio A".into(),
                domain_prefix: "other".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = create(
            &pool,
            TenantCreate {
                name: "Other".into(),
                domain_prefix: "studio-a".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn delete_cascade_removes_owned_rows() {
        let pool = test_pool().await;
        let t = create(
            &pool,
            TenantCreate {
                name: "Studio B".into(),
                domain_prefix: "studio-b".into(),
            },
        )
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO member (id, tenant_id, full_name, credits, created_at) VALUES (1, ?, 'Ada', 3, 0)",
        )
        .bind(t.id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO session (id, tenant_id, date, time, start_at, capacity, spots_left, completed) VALUES (2, ?, '2026-03-02', '10:00', 0, 4, 4, 0)",
        )
        .bind(t.id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO reservation (id, tenant_id, member_id, session_id, status, cancel_status, created_at, updated_at) VALUES (3, ?, 1, 2, 'active', 'none', 0, 0)",
        )
        .bind(t.id)
        .execute(&pool)
        .await
        .unwrap();

        assert!(delete_cascade(&pool, t.id).await.unwrap());

        let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member")
            .fetch_one(&pool)
            .await
            .unwrap();
        let reservations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(members, 0);
        assert_eq!(reservations, 0);
    }
}
