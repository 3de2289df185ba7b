//! Member API Handlers
//!
//! 名册和课时账的规则都在 `booking::ledger`；这里只做提取和转译。

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{CreditAdjust, Measurement, MeasurementCreate, Member, MemberCreate};

use crate::booking::{Actor, ledger};
use crate::core::ServerState;
use crate::db::repository::member;
use crate::utils::AppResult;

/// GET /api/members - 会员名册（管理员）
pub async fn list(actor: Actor, State(state): State<ServerState>) -> AppResult<Json<Vec<Member>>> {
    actor.require_admin()?;
    Ok(Json(member::find_all(&state.pool, actor.tenant_id).await?))
}

/// POST /api/members - 登记会员
pub async fn create(
    actor: Actor,
    State(state): State<ServerState>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<Member>> {
    let created = ledger::create_member(&state.pool, &actor, payload).await?;
    Ok(Json(created))
}

/// DELETE /api/members/:id - 注销会员
pub async fn delete(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    ledger::delete_member(&state.pool, &actor, id).await?;
    Ok(Json(()))
}

/// PUT /api/members/:id/credits - 调整课时
pub async fn adjust_credits(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreditAdjust>,
) -> AppResult<Json<Member>> {
    let updated = ledger::adjust_credits(&state.pool, &actor, id, payload.delta).await?;
    Ok(Json(updated))
}

/// GET /api/members/:id/measurements - 体测历史
pub async fn list_measurements(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Measurement>>> {
    let entries = ledger::list_measurements(&state.pool, &actor, id).await?;
    Ok(Json(entries))
}

/// POST /api/members/:id/measurements - 记录体测
pub async fn add_measurement(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MeasurementCreate>,
) -> AppResult<Json<Measurement>> {
    let created = ledger::add_measurement(
        &state.pool,
        &actor,
        id,
        payload,
        state.config.timezone,
        state.now_millis(),
    )
    .await?;
    Ok(Json(created))
}

/// DELETE /api/members/:id/measurements/:measurement_id - 删除体测记录
pub async fn delete_measurement(
    actor: Actor,
    State(state): State<ServerState>,
    Path((_id, measurement_id)): Path<(i64, i64)>,
) -> AppResult<Json<()>> {
    ledger::delete_measurement(&state.pool, &actor, measurement_id).await?;
    Ok(Json(()))
}
