//! Java Joy kiosk core
//!
//! Everything a café ordering screen calls into, without the screen:
//!
//! - **Cart Engine** (`cart`): priced lines keyed by item + option
//! - **Order submission** (`orders`): validation, idempotency key,
//!   single in-flight guard, upsert against the order store
//! - **Local history** (`history`): capped, deduplicated receipt mirror
//! - **Flow** (`flow`): hero → main → delivery options → payment
//! - **Catalog** (`menu`, `inventory`): built-in menu, availability mirror
//! - **Local storage** (`storage`): key-value backends (redb, memory)
//!
//! [`Kiosk`] wires them together.
//!
//! ```text
//! Kiosk::place_order
//!     ├─ snapshot cart + flow selection
//!     ├─ OrderSubmitter::submit ──▶ OrderStore::upsert_order
//!     └─ on success: clear cart, flow.order_placed, history.record_order
//! ```

pub mod app;
pub mod cart;
pub mod config;
pub mod device;
pub mod error;
pub mod flow;
pub mod history;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod storage;

// Re-exports
pub use app::Kiosk;
pub use cart::{Cart, CartLine, CartTotals};
pub use config::KioskConfig;
pub use device::DeviceId;
pub use error::{
    CheckoutError, FlowError, HistoryError, KioskError, LocalStoreError, OrderSubmissionError,
    RemoteError, ValidationError,
};
pub use flow::{FlowController, Language, Overlay, Screen};
pub use history::OrderHistory;
pub use inventory::{InventoryChange, InventoryMirror, SubscriptionId};
pub use orders::{
    Clock, HttpOrderStore, IdempotencyKey, InMemoryOrderStore, OrderContext, OrderStore,
    OrderSubmitter, SubmitOutcome, SystemClock,
};
pub use storage::{LocalStore, MemoryLocalStore, RedbLocalStore};
