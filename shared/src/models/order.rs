//! Order Model
//!
//! Wire types of the order upsert protocol:
//!
//! ```text
//! kiosk ── OrderRequest ──▶ order-store (upsert on idempotency_key)
//! kiosk ◀── Order ───────── order-store
//! ```

use crate::error::{AppError, ErrorCode};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order id assigned by the order store
pub type OrderId = u64;

// ============================================================================
// Payment / Order Type
// ============================================================================

/// Payment method
///
/// PIX is displayed as a static key; no gateway is involved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay at the counter
    Cash,
    /// Brazilian instant transfer
    Pix,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            other => Err(AppError::with_message(
                ErrorCode::PaymentMethodUnknown,
                format!("Unknown payment method: {}", other),
            )
            .with_detail("payment_method", other)),
        }
    }
}

/// Pickup at the counter or delivery on campus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Pickup,
    Delivery,
}

/// Delivery recipient and free-text location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub name: String,
    pub location: String,
}

impl DeliveryDetails {
    /// Trim both fields and require them non-empty
    pub fn new(name: &str, location: &str) -> Result<Self, AppError> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::DeliveryDetailsRequired,
                "Delivery name is required",
            )
            .with_detail("field", "name"));
        }
        if location.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::DeliveryDetailsRequired,
                "Delivery location is required",
            )
            .with_detail("field", "location"));
        }
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

// ============================================================================
// Request
// ============================================================================

/// One priced line of an order request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Cart line id (`itemId` or `itemId-optionKey`)
    pub id: String,
    #[serde(alias = "qty")]
    pub quantity: u32,
    /// Resolved display name
    pub name: String,
    /// Unit price including option surcharge
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Order upsert payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    /// Stable per-install random identifier
    pub device_id: String,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    /// Dedup key; equal keys collapse to one stored order
    pub idempotency_key: String,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<String>,
}

impl OrderRequest {
    /// Σ(unit price × quantity) over the items
    pub fn computed_total(&self) -> Decimal {
        money::sum_lines(self.items.iter().map(|l| (l.price, l.quantity)))
    }

    /// Delivery details, when this is a delivery order with both fields set
    pub fn delivery(&self) -> Option<DeliveryDetails> {
        match (&self.customer_name, &self.delivery_location) {
            (Some(name), Some(location)) => Some(DeliveryDetails {
                name: name.clone(),
                location: location.clone(),
            }),
            _ => None,
        }
    }

    /// Validate shape and totals
    ///
    /// Mirrors the kiosk's pre-submit checks so a misbehaving client can't
    /// store an inconsistent row.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.device_id.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "device_id is required",
            ));
        }
        if self.idempotency_key.trim().is_empty() {
            return Err(AppError::new(ErrorCode::IdempotencyKeyMissing));
        }
        if self.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        for line in &self.items {
            if line.quantity == 0 || line.quantity > money::MAX_QUANTITY {
                return Err(AppError::new(ErrorCode::InvalidQuantity)
                    .with_detail("line", line.id.clone())
                    .with_detail("quantity", line.quantity));
            }
            if line.price.is_sign_negative() || line.price > money::MAX_PRICE {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("Unit price out of range for {}", line.id),
                ));
            }
        }
        if self.total <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::InvalidAmount)
                .with_detail("total", money::to_f64(self.total)));
        }
        let computed = self.computed_total();
        if !money::money_eq(self.total, computed) {
            return Err(AppError::new(ErrorCode::OrderTotalMismatch)
                .with_detail("total", money::to_f64(self.total))
                .with_detail("computed", money::to_f64(computed)));
        }
        if self.order_type == OrderType::Delivery {
            DeliveryDetails::new(
                self.customer_name.as_deref().unwrap_or_default(),
                self.delivery_location.as_deref().unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Stored rows
// ============================================================================

/// Canonical order record returned by an upsert
///
/// The store's `total` and `created_at` are authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// Full order row as persisted by the order store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredOrder {
    pub id: OrderId,
    pub device_id: String,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<String>,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredOrder {
    /// Build a fresh row from a request
    pub fn from_request(id: OrderId, request: &OrderRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            device_id: request.device_id.clone(),
            items: request.items.clone(),
            total: request.total,
            payment_method: request.payment_method,
            order_type: request.order_type,
            customer_name: request.customer_name.clone(),
            delivery_location: request.delivery_location.clone(),
            idempotency_key: request.idempotency_key.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable columns, keeping id and creation time
    pub fn apply_request(&mut self, request: &OrderRequest, now: DateTime<Utc>) {
        self.device_id = request.device_id.clone();
        self.items = request.items.clone();
        self.total = request.total;
        self.payment_method = request.payment_method;
        self.order_type = request.order_type;
        self.customer_name = request.customer_name.clone();
        self.delivery_location = request.delivery_location.clone();
        self.updated_at = now;
    }

    /// Projection returned to the kiosk
    pub fn to_order(&self) -> Order {
        Order {
            id: self.id,
            total: self.total,
            payment_method: self.payment_method,
            created_at: self.created_at,
        }
    }
}

// ============================================================================
// Change notifications
// ============================================================================

/// What an upsert did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderChangeKind {
    Inserted,
    Updated,
}

/// Change notification published after each committed upsert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChange {
    pub kind: OrderChangeKind,
    pub order: StoredOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, qty: u32, price: i64) -> OrderLine {
        OrderLine {
            id: id.to_string(),
            quantity: qty,
            name: id.to_string(),
            price: Decimal::from(price),
        }
    }

    fn request(items: Vec<OrderLine>, total: i64) -> OrderRequest {
        OrderRequest {
            device_id: "device-1".to_string(),
            items,
            total: Decimal::from(total),
            payment_method: PaymentMethod::Cash,
            idempotency_key: "device-1:cash:16:1".to_string(),
            order_type: OrderType::Pickup,
            customer_name: None,
            delivery_location: None,
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        let err = "card".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMethodUnknown);
    }

    #[test]
    fn test_payment_method_serde() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Pix).unwrap(), "\"pix\"");
        assert!(serde_json::from_str::<PaymentMethod>("\"PIX\"").is_err());
    }

    #[test]
    fn test_delivery_details_trimmed() {
        let d = DeliveryDetails::new("  Ana ", " Bloco B ").unwrap();
        assert_eq!(d.name, "Ana");
        assert_eq!(d.location, "Bloco B");
        assert!(DeliveryDetails::new("   ", "Bloco B").is_err());
        assert!(DeliveryDetails::new("Ana", "").is_err());
    }

    #[test]
    fn test_validate_ok() {
        let req = request(vec![line("espresso", 2, 8)], 16);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_empty() {
        let req = request(vec![], 16);
        assert_eq!(req.validate().unwrap_err().code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_validate_mismatch() {
        let req = request(vec![line("espresso", 2, 8)], 17);
        assert_eq!(
            req.validate().unwrap_err().code,
            ErrorCode::OrderTotalMismatch
        );
    }

    #[test]
    fn test_validate_zero_total() {
        let req = request(vec![line("water", 1, 0)], 0);
        assert_eq!(req.validate().unwrap_err().code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn test_validate_zero_quantity() {
        let req = request(vec![line("espresso", 0, 8)], 8);
        assert_eq!(req.validate().unwrap_err().code, ErrorCode::InvalidQuantity);
    }

    #[test]
    fn test_validate_delivery_requires_details() {
        let mut req = request(vec![line("espresso", 2, 8)], 16);
        req.order_type = OrderType::Delivery;
        req.customer_name = Some("Ana".to_string());
        assert_eq!(
            req.validate().unwrap_err().code,
            ErrorCode::DeliveryDetailsRequired
        );

        req.delivery_location = Some("Library".to_string());
        assert!(req.validate().is_ok());
        assert_eq!(req.delivery().unwrap().location, "Library");
    }

    #[test]
    fn test_qty_alias_accepted() {
        let json = r#"{"id":"espresso","qty":2,"name":"Espresso","price":8}"#;
        let line: OrderLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_apply_request_keeps_identity() {
        let now = Utc::now();
        let req = request(vec![line("espresso", 2, 8)], 16);
        let mut row = StoredOrder::from_request(42, &req, now);

        let mut again = req.clone();
        again.payment_method = PaymentMethod::Pix;
        let later = now + chrono::Duration::seconds(1);
        row.apply_request(&again, later);

        assert_eq!(row.id, 42);
        assert_eq!(row.created_at, now);
        assert_eq!(row.updated_at, later);
        assert_eq!(row.to_order().payment_method, PaymentMethod::Pix);
    }
}
