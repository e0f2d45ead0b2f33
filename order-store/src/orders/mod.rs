//! Order persistence and upsert service
//!
//! ```text
//! POST /api/orders
//!     └─ OrdersService::upsert
//!         ├─ 1. Validate request (items, totals, delivery)
//!         ├─ 2. OrderStorage::upsert_order (single write transaction)
//!         │     ├─ idempotency_key known → overwrite row, keep id + created_at
//!         │     └─ new key → next id from counter, insert row + key
//!         ├─ 3. Broadcast OrderChange
//!         └─ 4. Return Order {id, total, payment_method, created_at}
//! ```

pub mod service;
pub mod storage;

pub use service::OrdersService;
pub use storage::{OrderStorage, StorageError, StorageResult};
