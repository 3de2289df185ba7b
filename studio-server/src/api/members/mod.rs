//! Member API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/credits", put(handler::adjust_credits))
        .route(
            "/{id}/measurements",
            get(handler::list_measurements).post(handler::add_measurement),
        )
        .route(
            "/{id}/measurements/{measurement_id}",
            delete(handler::delete_measurement),
        )
}
