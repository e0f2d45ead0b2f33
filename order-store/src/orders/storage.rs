//! redb-based storage layer for orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `StoredOrder` (JSON) | Order rows |
//! | `idempotency_keys` | `idempotency_key` | `order_id` | Upsert conflict target |
//! | `counters` | `"order_count"` | `u64` | Last assigned order id |
//!
//! # Durability
//!
//! redb commits are durable once `commit()` returns. An upsert touches all
//! three tables inside one write transaction, and redb allows a single
//! writer at a time, so two requests with the same key can never both
//! insert.

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use shared::models::{OrderChangeKind, OrderId, OrderRequest, StoredOrder};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Order rows: key = order_id, value = JSON-serialized StoredOrder
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Idempotency index: key = idempotency_key, value = order_id
const IDEMPOTENCY_TABLE: TableDefinition<&str, u64> = TableDefinition::new("idempotency_keys");

/// Counters: key = name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Idempotency key {key} points at missing order {order_id}")]
    DanglingKey { key: String, order_id: OrderId },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(IDEMPOTENCY_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_COUNT_KEY)?.is_none() {
                counters.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert or update the order owning `request.idempotency_key`
    ///
    /// An existing row keeps its id and `created_at`; every other column is
    /// replaced by the request. Returns the stored row and what happened.
    pub fn upsert_order(
        &self,
        request: &OrderRequest,
        now: DateTime<Utc>,
    ) -> StorageResult<(StoredOrder, OrderChangeKind)> {
        let key = request.idempotency_key.as_str();
        let txn = self.db.begin_write()?;
        let result = {
            let mut keys = txn.open_table(IDEMPOTENCY_TABLE)?;
            let mut orders = txn.open_table(ORDERS_TABLE)?;

            let existing_id = keys.get(key)?.map(|guard| guard.value());
            match existing_id {
                Some(order_id) => {
                    let bytes = orders
                        .get(order_id)?
                        .map(|guard| guard.value().to_vec())
                        .ok_or_else(|| StorageError::DanglingKey {
                            key: key.to_string(),
                            order_id,
                        })?;
                    let mut row: StoredOrder = serde_json::from_slice(&bytes)?;
                    row.apply_request(request, now);
                    orders.insert(order_id, serde_json::to_vec(&row)?.as_slice())?;
                    (row, OrderChangeKind::Updated)
                }
                None => {
                    let mut counters = txn.open_table(COUNTERS_TABLE)?;
                    let order_id = counters
                        .get(ORDER_COUNT_KEY)?
                        .map(|guard| guard.value())
                        .unwrap_or(0)
                        + 1;
                    counters.insert(ORDER_COUNT_KEY, order_id)?;

                    let row = StoredOrder::from_request(order_id, request, now);
                    orders.insert(order_id, serde_json::to_vec(&row)?.as_slice())?;
                    keys.insert(key, order_id)?;
                    (row, OrderChangeKind::Inserted)
                }
            }
        };
        txn.commit()?;
        Ok(result)
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: OrderId) -> StorageResult<Option<StoredOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Find the order owning an idempotency key
    pub fn find_by_idempotency_key(&self, key: &str) -> StorageResult<Option<StoredOrder>> {
        let order_id = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(IDEMPOTENCY_TABLE)?;
            table.get(key)?.map(|guard| guard.value())
        };
        match order_id {
            Some(id) => self.get_order(id),
            None => Ok(None),
        }
    }

    /// Most recent orders first (descending id)
    pub fn list_recent(&self, limit: usize) -> StorageResult<Vec<StoredOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::with_capacity(limit.min(256));
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Number of stored orders
    pub fn order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }
}
