//! Admin API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Reservation, ReservationWithSession};

use crate::booking::{Actor, SweepReport, engine, run_sweep};
use crate::core::ServerState;
use crate::db::repository::reservation;
use crate::utils::time;
use crate::utils::AppResult;

/// GET /api/admin/cancel-requests - 待审核的取消申请
pub async fn pending_cancel_requests(
    actor: Actor,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ReservationWithSession>>> {
    actor.require_admin()?;
    Ok(Json(
        reservation::find_pending_cancel(&state.pool, actor.tenant_id).await?,
    ))
}

/// POST /api/admin/cancel-requests/:id/approve - 批准取消
pub async fn approve(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let updated = engine::admin_approve(&state.pool, &actor, id, state.now_millis()).await?;
    Ok(Json(updated))
}

/// POST /api/admin/cancel-requests/:id/reject - 驳回取消
pub async fn reject(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let updated = engine::admin_reject(&state.pool, &actor, id, state.now_millis()).await?;
    Ok(Json(updated))
}

/// POST /api/admin/reservations/:id/cancel-refund - 强制取消并补偿
pub async fn cancel_refund(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let updated = engine::admin_cancel_refund(&state.pool, &actor, id, state.now_millis()).await?;
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct AutoReservePayload {
    pub member_ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct AutoReserveResult {
    pub created: u32,
}

/// POST /api/admin/sessions/:id/auto-reserve - 批量代订
pub async fn auto_reserve(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AutoReservePayload>,
) -> AppResult<Json<AutoReserveResult>> {
    let created = engine::auto_reserve(
        &state.pool,
        &actor,
        id,
        &payload.member_ids,
        state.now_millis(),
    )
    .await?;
    Ok(Json(AutoReserveResult { created }))
}

/// POST /api/admin/sweep - 立即执行一次清扫
pub async fn sweep(actor: Actor, State(state): State<ServerState>) -> AppResult<Json<SweepReport>> {
    actor.require_admin()?;
    let report = run_sweep(&state.pool, state.now_millis()).await?;
    Ok(Json(report))
}

/// 仪表盘统计
#[derive(Serialize)]
pub struct DashboardStats {
    pub member_count: i64,
    pub upcoming_sessions: i64,
    pub pending_cancel_requests: i64,
    /// 今日（营业时区）课程的总容量与已订名额
    pub today_capacity: i64,
    pub today_booked: i64,
}

/// GET /api/admin/dashboard - 仪表盘统计
pub async fn dashboard(
    actor: Actor,
    State(state): State<ServerState>,
) -> AppResult<Json<DashboardStats>> {
    actor.require_admin()?;
    let tenant_id = actor.tenant_id;

    let member_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE tenant_id = ?")
            .bind(tenant_id)
            .fetch_one(&state.pool)
            .await
            .map_err(crate::db::repository::RepoError::from)?;
    let upcoming_sessions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM session WHERE tenant_id = ? AND completed = 0",
    )
    .bind(tenant_id)
    .fetch_one(&state.pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;
    let pending_cancel_requests: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservation WHERE tenant_id = ? AND cancel_status = 'pending'",
    )
    .bind(tenant_id)
    .fetch_one(&state.pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;

    let today = time::format_date(time::today(state.now_millis(), state.config.timezone));
    let (today_capacity, today_booked): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(capacity), 0), COALESCE(SUM(capacity - spots_left), 0)
         FROM session WHERE tenant_id = ? AND date = ?",
    )
    .bind(tenant_id)
    .bind(&today)
    .fetch_one(&state.pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;

    Ok(Json(DashboardStats {
        member_count,
        upcoming_sessions,
        pending_cancel_requests,
        today_capacity,
        today_booked,
    }))
}
