//! Order store clients
//!
//! [`OrderStore`] is the seam between submission and the remote store.
//! [`HttpOrderStore`] talks to the `order-store` service; [`InMemoryOrderStore`]
//! keeps the same upsert semantics in process (offline demo, tests).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{Order, OrderId, OrderRequest, StoredOrder};

use crate::error::RemoteError;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert or update the order owning `request.idempotency_key`
    async fn upsert_order(&self, request: &OrderRequest) -> Result<Order, RemoteError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>, RemoteError>;

    /// Most recent orders first
    async fn list_recent(&self, limit: usize) -> Result<Vec<StoredOrder>, RemoteError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client for the order store
///
/// No request timeout: a submission runs to completion or failure.
#[derive(Debug, Clone)]
pub struct HttpOrderStore {
    client: Client,
    base_url: String,
}

impl HttpOrderStore {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL of the order store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Decode the `ApiResponse` envelope, success or error
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(envelope) => Ok(envelope.into_result()?),
            Err(e) if status.is_success() => Err(RemoteError::Malformed(e.to_string())),
            Err(_) => Err(RemoteError::Rejected {
                code: ErrorCode::Unknown,
                message: format!("HTTP {}: {}", status, text.trim()),
            }),
        }
    }
}

#[async_trait]
impl OrderStore for HttpOrderStore {
    async fn upsert_order(&self, request: &OrderRequest) -> Result<Order, RemoteError> {
        let response = self
            .client
            .post(self.url("api/orders"))
            .json(request)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("api/orders/{}", id)))
            .send()
            .await?;
        match self.handle_response(response).await {
            Ok(order) => Ok(Some(order)),
            Err(RemoteError::Rejected {
                code: ErrorCode::OrderNotFound,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<StoredOrder>, RemoteError> {
        let response = self
            .client
            .get(self.url("api/orders"))
            .query(&[("limit", limit)])
            .send()
            .await?;
        self.handle_response(response).await
    }
}

// ============================================================================
// In memory
// ============================================================================

#[derive(Debug, Default)]
struct Rows {
    orders: BTreeMap<OrderId, StoredOrder>,
    keys: HashMap<String, OrderId>,
    last_id: OrderId,
}

/// Process-local order store with the same upsert semantics as the service
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    rows: Mutex<Rows>,
    writes: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next inserted order gets `id`
    pub fn starting_at(id: OrderId) -> Self {
        let store = Self::default();
        store.rows.lock().last_id = id.saturating_sub(1);
        store
    }

    /// Number of upsert calls received, accepted or not
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn order_count(&self) -> usize {
        self.rows.lock().orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn upsert_order(&self, request: &OrderRequest) -> Result<Order, RemoteError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        request.validate()?;

        let now = Utc::now();
        let mut rows = self.rows.lock();
        let row = match rows.keys.get(&request.idempotency_key).copied() {
            Some(id) => {
                let row = rows.orders.get_mut(&id).ok_or_else(|| RemoteError::Rejected {
                    code: ErrorCode::DatabaseError,
                    message: format!("Idempotency key points at missing order {}", id),
                })?;
                row.apply_request(request, now);
                row.clone()
            }
            None => {
                rows.last_id += 1;
                let id = rows.last_id;
                let row = StoredOrder::from_request(id, request, now);
                rows.orders.insert(id, row.clone());
                rows.keys.insert(request.idempotency_key.clone(), id);
                row
            }
        };
        Ok(row.to_order())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>, RemoteError> {
        Ok(self.rows.lock().orders.get(&id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<StoredOrder>, RemoteError> {
        Ok(self
            .rows
            .lock()
            .orders
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
