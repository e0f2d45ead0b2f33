//! Order API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use shared::models::{Order, OrderChange, OrderId, OrderRequest, StoredOrder};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::core::ServerState;
use crate::core::config::MAX_RECENT_ORDERS_LIMIT;
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Upsert an order on its idempotency key
pub async fn upsert(
    State(state): State<ServerState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let Json(request) =
        payload.map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, e.body_text()))?;
    let order = state.orders.upsert(request)?;
    Ok(ApiResponse::success(order))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<OrderId>,
) -> AppResult<ApiResponse<StoredOrder>> {
    let order = state.orders.get(id)?;
    Ok(ApiResponse::success(order))
}

/// Most recent orders first
pub async fn list_recent(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<StoredOrder>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.recent_orders_limit)
        .min(MAX_RECENT_ORDERS_LIMIT);
    let orders = state.orders.list_recent(limit)?;
    Ok(ApiResponse::success(orders))
}

/// Server-sent change feed, one `order_change` event per committed upsert
pub async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.orders.subscribe();
    tracing::debug!("Order change subscriber connected");
    Sse::new(change_stream(rx)).keep_alive(KeepAlive::default())
}

fn change_stream(
    rx: broadcast::Receiver<OrderChange>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(change) => match Event::default().event("order_change").json_data(&change) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => {
                        tracing::warn!(
                            order_id = change.order.id,
                            "Failed to encode order change: {}",
                            e
                        );
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Order change subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
