//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tenants`] - 租户目录（超管）
//! - [`members`] - 会员名册与课时
//! - [`sessions`] - 课表管理
//! - [`reservations`] - 会员自助预约
//! - [`admin`] - 审核队列、代订、清扫、仪表盘

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod extract;

pub mod admin;
pub mod health;
pub mod members;
pub mod reservations;
pub mod sessions;
pub mod tenants;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// 组装完整路由
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(tenants::router())
        .merge(members::router())
        .merge(sessions::router())
        .merge(reservations::router())
        .merge(admin::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
