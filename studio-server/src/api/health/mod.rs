//! 健康检查路由

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需租户上下文)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(handler::health))
}
