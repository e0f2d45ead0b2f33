//! OrdersService - validation, upsert and change broadcasting

use chrono::Utc;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderChange, OrderId, OrderRequest, StoredOrder};
use shared::money;
use tokio::sync::broadcast;

use super::storage::{OrderStorage, StorageError};

/// Change broadcast channel capacity
const CHANGE_CHANNEL_CAPACITY: usize = 1024;

pub struct OrdersService {
    storage: OrderStorage,
    change_tx: broadcast::Sender<OrderChange>,
}

impl std::fmt::Debug for OrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersService")
            .field("storage", &self.storage)
            .field("change_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrdersService {
    pub fn new(storage: OrderStorage) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { storage, change_tx }
    }

    /// Subscribe to committed order changes
    pub fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.change_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Validate and upsert on the idempotency key
    ///
    /// The change is broadcast only after the write transaction commits.
    pub fn upsert(&self, request: OrderRequest) -> AppResult<Order> {
        request.validate()?;

        let (row, kind) = self.storage.upsert_order(&request, Utc::now())?;
        tracing::info!(
            order_id = row.id,
            idempotency_key = %row.idempotency_key,
            total = %money::format_amount(row.total),
            payment_method = %row.payment_method,
            kind = ?kind,
            "Order upserted"
        );

        let order = row.to_order();
        if self.change_tx.send(OrderChange { kind, order: row }).is_err() {
            tracing::debug!("Order change not delivered: no active subscribers");
        }
        Ok(order)
    }

    /// Full row by id
    pub fn get(&self, order_id: OrderId) -> AppResult<StoredOrder> {
        self.storage.get_order(order_id)?.ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
        })
    }

    /// Most recent orders first
    pub fn list_recent(&self, limit: usize) -> AppResult<Vec<StoredOrder>> {
        Ok(self.storage.list_recent(limit)?)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => {
                AppError::internal(format!("Corrupt order row: {}", e))
            }
            other => AppError::database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderChangeKind, OrderLine, OrderType, PaymentMethod};

    fn service() -> OrdersService {
        OrdersService::new(OrderStorage::open_in_memory().unwrap())
    }

    fn request(key: &str) -> OrderRequest {
        OrderRequest {
            device_id: "device-1".to_string(),
            items: vec![OrderLine {
                id: "cappuccino-opt_item_vegan_milk".to_string(),
                quantity: 1,
                name: "Cappuccino".to_string(),
                price: Decimal::from(18),
            }],
            total: Decimal::from(18),
            payment_method: PaymentMethod::Pix,
            idempotency_key: key.to_string(),
            order_type: OrderType::Pickup,
            customer_name: None,
            delivery_location: None,
        }
    }

    #[test]
    fn test_upsert_returns_receipt() {
        let svc = service();
        let order = svc.upsert(request("k1")).unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.total, Decimal::from(18));
        assert_eq!(order.payment_method, PaymentMethod::Pix);
    }

    #[test]
    fn test_upsert_rejects_invalid_before_write() {
        let svc = service();
        let mut req = request("k1");
        req.total = Decimal::from(20);
        let err = svc.upsert(req).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderTotalMismatch);
        assert_eq!(svc.storage().order_count().unwrap(), 0);
    }

    #[test]
    fn test_get_not_found() {
        let err = service().get(7).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_changes_broadcast_after_commit() {
        let svc = service();
        let mut rx = svc.subscribe();

        let first = svc.upsert(request("k1")).unwrap();
        let second = svc.upsert(request("k1")).unwrap();
        assert_eq!(first.id, second.id);

        let inserted = rx.recv().await.unwrap();
        assert_eq!(inserted.kind, OrderChangeKind::Inserted);
        assert_eq!(inserted.order.id, first.id);

        let updated = rx.recv().await.unwrap();
        assert_eq!(updated.kind, OrderChangeKind::Updated);
        assert_eq!(updated.order.id, first.id);
    }
}
