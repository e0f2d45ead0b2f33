//! Data models
//!
//! Shared between order-store and the kiosk (via API).
//! Order ids are `u64` (sequential, assigned by the order store).

pub mod history;
pub mod menu;
pub mod order;

// Re-exports
pub use history::*;
pub use menu::*;
pub use order::*;
