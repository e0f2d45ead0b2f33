//! Availability mirror
//!
//! A flat `item id → available` map kept in sync with a remote feed and
//! persisted locally so the menu renders correctly before the feed
//! connects. Items never mentioned are available.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::storage::LocalStore;

pub const INVENTORY_KEY: &str = "java-joy-inventory";

/// One row change from the remote inventory feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryChange {
    Upsert { item_id: String, available: bool },
    Delete { item_id: String },
}

/// Handle returned by [`InventoryMirror::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&HashMap<String, bool>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    availability: HashMap<String, bool>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

pub struct InventoryMirror {
    store: Arc<dyn LocalStore>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for InventoryMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("InventoryMirror")
            .field("availability", &inner.availability)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl InventoryMirror {
    /// Load the persisted map; unreadable data starts empty
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let availability = match store.get(INVENTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable inventory cache");
                HashMap::new()
            }),
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Inventory cache unavailable");
                HashMap::new()
            }
        };
        Self {
            store,
            inner: Mutex::new(Inner {
                availability,
                ..Inner::default()
            }),
        }
    }

    pub fn is_available(&self, item_id: &str) -> bool {
        self.inner
            .lock()
            .availability
            .get(item_id)
            .copied()
            .unwrap_or(true)
    }

    pub fn set_available(&self, item_id: &str, available: bool) {
        self.apply_change(InventoryChange::Upsert {
            item_id: item_id.to_string(),
            available,
        });
    }

    /// Apply a feed change, persist, then notify listeners
    pub fn apply_change(&self, change: InventoryChange) {
        let (snapshot, listeners) = {
            let mut inner = self.inner.lock();
            match change {
                InventoryChange::Upsert { item_id, available } => {
                    inner.availability.insert(item_id, available);
                }
                InventoryChange::Delete { item_id } => {
                    inner.availability.remove(&item_id);
                }
            }
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.availability.clone(), listeners)
        };

        self.persist(&snapshot);
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.inner.lock().availability.clone()
    }

    /// Register a listener called with the full map after every change
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&HashMap<String, bool>) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns false when the id was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    fn persist(&self, snapshot: &HashMap<String, bool>) {
        let result = serde_json::to_string(snapshot)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(INVENTORY_KEY, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist inventory cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLocalStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mirror() -> (Arc<MemoryLocalStore>, InventoryMirror) {
        let store = Arc::new(MemoryLocalStore::new());
        let mirror = InventoryMirror::load(store.clone());
        (store, mirror)
    }

    #[test]
    fn test_unknown_items_available() {
        let (_, mirror) = mirror();
        assert!(mirror.is_available("espresso"));
    }

    #[test]
    fn test_set_and_delete() {
        let (_, mirror) = mirror();
        mirror.set_available("croissant", false);
        assert!(!mirror.is_available("croissant"));

        mirror.apply_change(InventoryChange::Delete {
            item_id: "croissant".into(),
        });
        assert!(mirror.is_available("croissant"));
        assert!(mirror.snapshot().is_empty());
    }

    #[test]
    fn test_persisted_across_load() {
        let (store, mirror) = mirror();
        mirror.set_available("cupcake", false);

        let reloaded = InventoryMirror::load(store);
        assert!(!reloaded.is_available("cupcake"));
    }

    #[test]
    fn test_corrupt_cache_starts_empty() {
        let store = Arc::new(MemoryLocalStore::new());
        store.set(INVENTORY_KEY, "{oops").unwrap();
        let mirror = InventoryMirror::load(store);
        assert!(mirror.snapshot().is_empty());
    }

    #[test]
    fn test_listeners_notified_until_unsubscribed() {
        let (_, mirror) = mirror();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = mirror.subscribe(move |snapshot| {
            assert!(snapshot.contains_key("mocha"));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        mirror.set_available("mocha", false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(mirror.unsubscribe(id));
        assert!(!mirror.unsubscribe(id));
        mirror.set_available("mocha", true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_change_feed_json() {
        let json = r#"{"type":"upsert","item_id":"water","available":false}"#;
        let change: InventoryChange = serde_json::from_str(json).unwrap();
        assert_eq!(
            change,
            InventoryChange::Upsert {
                item_id: "water".into(),
                available: false
            }
        );
    }
}
