//! Local key-value storage
//!
//! The kiosk persists three values, each a string under a fixed key:
//!
//! | Key | Value |
//! |-----|-------|
//! | `jj_order_history` | JSON array of history entries |
//! | `jj_device_id` | opaque device identifier |
//! | `java-joy-inventory` | JSON object `item id → available` |
//!
//! Access is synchronous; callers treat it as non-suspending.

mod memory;
mod redb_store;

pub use self::memory::MemoryLocalStore;
pub use self::redb_store::RedbLocalStore;

use crate::error::LocalStoreError;

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}
