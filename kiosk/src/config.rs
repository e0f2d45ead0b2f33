use std::path::PathBuf;

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::orders::idempotency::DEFAULT_WINDOW_MS;

/// Kiosk configuration
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ORDER_STORE_URL | http://localhost:3000 | Order store base URL |
/// | KIOSK_DATA_DIR | ./data/kiosk | Local key-value database directory |
/// | IDEMPOTENCY_WINDOW_MS | 2000 | Dedup time bucket width |
/// | HISTORY_LIMIT | 50 | Local history cap |
/// | PIX_KEY | xxxxxxxxxx | Static PIX key shown on the payment screen |
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub order_store_url: String,
    pub data_dir: String,
    pub idempotency_window_ms: u64,
    pub history_limit: usize,
    pub pix_key: String,
}

impl KioskConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            order_store_url: std::env::var("ORDER_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            data_dir: std::env::var("KIOSK_DATA_DIR").unwrap_or_else(|_| "./data/kiosk".into()),
            idempotency_window_ms: std::env::var("IDEMPOTENCY_WINDOW_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_WINDOW_MS),
            history_limit: std::env::var("HISTORY_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
            pix_key: std::env::var("PIX_KEY").unwrap_or_else(|_| "xxxxxxxxxx".into()),
        }
    }

    /// Override the order store URL and data directory
    ///
    /// Mostly used by tests
    pub fn with_overrides(order_store_url: impl Into<String>, data_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.order_store_url = order_store_url.into();
        config.data_dir = data_dir.into();
        config
    }

    /// Path of the local key-value database
    pub fn local_db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("kiosk.redb")
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
