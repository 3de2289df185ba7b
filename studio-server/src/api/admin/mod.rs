//! Admin API 模块：审核队列、强制操作、清扫、仪表盘

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/cancel-requests", get(handler::pending_cancel_requests))
        .route("/cancel-requests/{id}/approve", post(handler::approve))
        .route("/cancel-requests/{id}/reject", post(handler::reject))
        .route(
            "/reservations/{id}/cancel-refund",
            post(handler::cancel_refund),
        )
        .route("/sessions/{id}/auto-reserve", post(handler::auto_reserve))
        .route("/sweep", post(handler::sweep))
        .route("/dashboard", get(handler::dashboard))
}
