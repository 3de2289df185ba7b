//! Session API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Session, SessionCreate, SessionCreated, SessionParticipant};

use crate::booking::{Actor, catalog};
use crate::core::ServerState;
use crate::db::repository::session;
use crate::utils::AppResult;

/// GET /api/sessions/upcoming - 未结课课程，开课时间升序
pub async fn upcoming(
    actor: Actor,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Session>>> {
    Ok(Json(
        session::find_upcoming(&state.pool, actor.tenant_id).await?,
    ))
}

/// GET /api/sessions/completed - 已结课课程（管理员），最近的在前
pub async fn completed(
    actor: Actor,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Session>>> {
    actor.require_admin()?;
    Ok(Json(
        session::find_completed(&state.pool, actor.tenant_id).await?,
    ))
}

/// POST /api/sessions - 创建课程（单次或周期批量）
pub async fn create(
    actor: Actor,
    State(state): State<ServerState>,
    Json(payload): Json<SessionCreate>,
) -> AppResult<Json<SessionCreated>> {
    let created = catalog::create_session(
        &state.pool,
        &actor,
        payload,
        state.config.timezone,
        state.now_millis(),
    )
    .await?;
    Ok(Json(created))
}

/// DELETE /api/sessions/:id - 删除课程并补偿
pub async fn delete(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    catalog::delete_session(&state.pool, &actor, id, state.now_millis()).await?;
    Ok(Json(()))
}

/// GET /api/sessions/:id/participants - 课程名单（管理员）
pub async fn participants(
    actor: Actor,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SessionParticipant>>> {
    actor.require_admin()?;
    Ok(Json(
        session::participants(&state.pool, actor.tenant_id, id).await?,
    ))
}
