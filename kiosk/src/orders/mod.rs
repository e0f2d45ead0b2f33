//! Order submission
//!
//! ```text
//! OrderSubmitter::submit(items, total, method, context)
//!     ├─ 1. In-flight guard (held → Ignored)
//!     ├─ 2. Validate: items, payment method, total
//!     ├─ 3. IdempotencyKey::derive(device, method, total, time bucket)
//!     ├─ 4. OrderStore::upsert_order
//!     └─ 5. Placed(Order) with the store's total and created_at
//! ```

pub mod idempotency;
pub mod remote;
pub mod submit;

pub use idempotency::IdempotencyKey;
pub use remote::{HttpOrderStore, InMemoryOrderStore, OrderStore};
pub use submit::{Clock, OrderContext, OrderSubmitter, SubmitOutcome, SystemClock};
