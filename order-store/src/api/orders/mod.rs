//! Order API Module
//!
//! All writes go through [`crate::orders::OrdersService::upsert`].

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_recent).post(handler::upsert))
        .route("/events", get(handler::events))
        .route("/{id}", get(handler::get_by_id))
}
