//! Session API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/upcoming", get(handler::upcoming))
        .route("/completed", get(handler::completed))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/participants", get(handler::participants))
}
