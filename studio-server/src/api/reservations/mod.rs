//! Reservation API 模块（会员自助）

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::reserve))
        .route("/mine", get(handler::mine))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/cancel-request", post(handler::request_cancellation))
        .route("/{id}/move", post(handler::move_reservation))
}
