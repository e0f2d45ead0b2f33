//! Local history mirror
//!
//! Best-effort cache of placed orders under `jj_order_history`, most recent
//! first, capped and deduplicated by order id. Nothing here returns an
//! error to the caller: failures are logged and the list degrades to empty
//! or unchanged.

use std::sync::Arc;

use shared::models::{Order, OrderHistoryEntry};

use crate::error::HistoryError;
use crate::storage::LocalStore;

pub const HISTORY_KEY: &str = "jj_order_history";

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct OrderHistory {
    store: Arc<dyn LocalStore>,
    limit: usize,
}

impl std::fmt::Debug for OrderHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderHistory")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl OrderHistory {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn LocalStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
        }
    }

    /// Stored entries, most recent first; empty on any read or parse error
    pub fn load(&self) -> Vec<OrderHistoryEntry> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Order history unreadable, showing empty list");
            Vec::new()
        })
    }

    /// Put `order` at the front, replacing any entry with the same id
    ///
    /// Returns the list as it should now be displayed, even when writing it
    /// back failed.
    pub fn record_order(&self, order: &Order) -> Vec<OrderHistoryEntry> {
        let mut entries = match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Order history unreadable, starting over");
                Vec::new()
            }
        };

        entries.retain(|entry| entry.id != order.id);
        entries.insert(0, OrderHistoryEntry::from(order));
        entries.truncate(self.limit);

        if let Err(e) = self.try_store(&entries) {
            tracing::error!(order_id = order.id, error = %e, "Failed to persist order history");
        }
        entries
    }

    /// Remove the stored list
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            tracing::warn!(error = %e, "Failed to clear order history");
        }
    }

    fn try_load(&self) -> Result<Vec<OrderHistoryEntry>, HistoryError> {
        match self.store.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_store(&self, entries: &[OrderHistoryEntry]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(HISTORY_KEY, &json)?;
        Ok(())
    }
}
