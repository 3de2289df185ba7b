//! Reservation API Handlers
//!
//! 会员自助入口。所有规则（24 小时窗口、名额、课时余额、状态机）都在
//! `booking::engine`，这里只补上当前时间。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{CancelRequestPayload, MovePayload, Reservation, ReservationWithSession};

use crate::booking::{Actor, engine};
use crate::core::ServerState;
use crate::db::repository::reservation;
use crate::utils::AppResult;

#[derive(Deserialize)]
pub struct ReservePayload {
    pub session_id: i64,
}

/// POST /api/reservations - 预约课程
pub async fn reserve(
    actor: Actor,
    State(state): State<ServerState>,
    Json(payload): Json<ReservePayload>,
) -> AppResult<Json<Reservation>> {
    let created = engine::reserve(&state.pool, &actor, payload.session_id, state.now_millis())
        .await?;
    Ok(Json(created))
}

/// GET /api/reservations/mine - 我的有效预约，开课时间升序
pub async fn mine(
    actor: Actor,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ReservationWithSession>>> {
    let member_id = actor.require_member()?;
    Ok(Json(
        reservation::find_active_by_member(&state.pool, actor.tenant_id, member_id).await?,
    ))
}

/// POST /api/reservations/:id/cancel - 自助取消（开课 24 小时前）
pub async fn cancel(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let updated = engine::cancel(&state.pool, &actor, id, state.now_millis()).await?;
    Ok(Json(updated))
}

/// POST /api/reservations/:id/cancel-request - 提交取消申请
pub async fn request_cancellation(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CancelRequestPayload>,
) -> AppResult<Json<Reservation>> {
    let updated = engine::request_cancellation(
        &state.pool,
        &actor,
        id,
        &payload.reason,
        state.now_millis(),
    )
    .await?;
    Ok(Json(updated))
}

/// POST /api/reservations/:id/move - 换课
pub async fn move_reservation(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MovePayload>,
) -> AppResult<Json<Reservation>> {
    let created = engine::move_reservation(
        &state.pool,
        &actor,
        id,
        payload.target_id,
        state.now_millis(),
    )
    .await?;
    Ok(Json(created))
}
