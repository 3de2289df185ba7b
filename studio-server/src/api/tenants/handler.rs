//! Tenant API Handlers
//!
//! 租户目录由超管维护；普通请求只在提取 `Actor` 时按 `x-studio` 前缀解析
//! 租户，这里是唯一能增删租户的入口。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{Tenant, TenantCreate};

use crate::api::extract::SuperAdmin;
use crate::core::ServerState;
use crate::db::repository::tenant;
use crate::utils::{AppError, AppResult};

/// GET /api/tenants - 全部租户
pub async fn list(_: SuperAdmin, State(state): State<ServerState>) -> AppResult<Json<Vec<Tenant>>> {
    Ok(Json(tenant::find_all(&state.pool).await?))
}

/// POST /api/tenants - 开通租户
pub async fn create(
    _: SuperAdmin,
    State(state): State<ServerState>,
    Json(payload): Json<TenantCreate>,
) -> AppResult<Json<Tenant>> {
    let name = payload.name.trim();
    let prefix = payload.domain_prefix.trim().to_lowercase();
    if name.is_empty() || prefix.is_empty() {
        return Err(AppError::validation("Name and domain prefix are required"));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::validation(
            "Domain prefix may only contain letters, digits and '-'",
        ));
    }

    let created = tenant::create(
        &state.pool,
        TenantCreate {
            name: name.to_owned(),
            domain_prefix: prefix,
        },
    )
    .await?;
    tracing::info!(tenant_id = created.id, prefix = %created.domain_prefix, "Tenant created");
    Ok(Json(created))
}

#[derive(Deserialize)]
pub struct SetActivePayload {
    pub is_active: bool,
}

/// PUT /api/tenants/:id/active - 启用/停用租户
pub async fn set_active(
    _: SuperAdmin,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SetActivePayload>,
) -> AppResult<Json<Tenant>> {
    let updated = tenant::set_active(&state.pool, id, payload.is_active).await?;
    tracing::info!(tenant_id = id, is_active = payload.is_active, "Tenant toggled");
    Ok(Json(updated))
}

/// DELETE /api/tenants/:id - 删除租户及其全部数据
pub async fn delete(
    _: SuperAdmin,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    if !tenant::delete_cascade(&state.pool, id).await? {
        return Err(AppError::not_found(format!("Tenant {id}")));
    }
    tracing::info!(tenant_id = id, "Tenant deleted");
    Ok(Json(()))
}
