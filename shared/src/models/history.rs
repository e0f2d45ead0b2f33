//! Order history entry
//!
//! Local projection of [`Order`] kept by the kiosk for offline display.
//! Serialized as `{id, total, payment_method, created_at}`.

use super::order::{Order, OrderId, PaymentMethod};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderHistoryEntry {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderHistoryEntry {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            total: order.total,
            payment_method: order.payment_method,
            created_at: order.created_at,
        }
    }
}
