//! Idempotency key derivation
//!
//! `{device}:{method}:{total}:{bucket}` with `bucket = floor(epoch_ms / window_ms)`.
//! Same device, method and amount inside one window collapse to one order;
//! the next window is a new order.

use std::fmt;

use rust_decimal::Decimal;
use shared::models::PaymentMethod;

use crate::device::DeviceId;

/// Default bucket width in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 2000;

/// Coarse time bucket for `epoch_ms`
pub fn time_bucket(epoch_ms: i64, window_ms: u64) -> i64 {
    let window = i64::try_from(window_ms.max(1)).unwrap_or(i64::MAX);
    epoch_ms.div_euclid(window)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn derive(
        device: &DeviceId,
        method: PaymentMethod,
        total: Decimal,
        epoch_ms: i64,
        window_ms: u64,
    ) -> Self {
        Self(format!(
            "{}:{}:{}:{}",
            device,
            method,
            total.normalize(),
            time_bucket(epoch_ms, window_ms)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
