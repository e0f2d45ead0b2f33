//! HTTP API
//!
//! | Path | Method | Description |
//! |------|------|------|
//! | /health | GET | Health check |
//! | /api/orders | POST | Upsert on idempotency key |
//! | /api/orders | GET | Recent orders (`?limit=N`) |
//! | /api/orders/{id} | GET | Order detail |
//! | /api/orders/events | GET | SSE change feed |

pub mod health;
pub mod orders;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
}

/// Build the fully layered router bound to `state`
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
