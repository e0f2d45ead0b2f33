//! Per-install device identifier
//!
//! A random UUID generated on first use and persisted under `jj_device_id`.
//! It only scopes idempotency keys; it is not an identity.

use std::fmt;

use crate::storage::LocalStore;

pub const DEVICE_ID_KEY: &str = "jj_device_id";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Read the stored id, or generate and store a new one
    ///
    /// Storage failures fall back to an id that lives for this session only.
    pub fn load_or_create(store: &dyn LocalStore) -> Self {
        match store.get(DEVICE_ID_KEY) {
            Ok(Some(existing)) if !existing.trim().is_empty() => return Self(existing),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Device id unreadable, using an ephemeral one");
                return Self::random();
            }
        }

        let id = Self::random();
        match store.set(DEVICE_ID_KEY, id.as_str()) {
            Ok(()) => tracing::info!(device_id = %id, "Generated device id"),
            Err(e) => tracing::warn!(error = %e, "Failed to persist device id"),
        }
        id
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
