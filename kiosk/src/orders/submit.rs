//! OrderSubmitter - turns a cart snapshot into exactly one stored order

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use shared::models::{
    DeliveryDetails, Order, OrderLine, OrderRequest, OrderType, PaymentMethod,
};
use shared::money;

use super::idempotency::{DEFAULT_WINDOW_MS, IdempotencyKey};
use super::remote::OrderStore;
use crate::device::DeviceId;
use crate::error::{CheckoutError, OrderSubmissionError, ValidationError};

/// Wall clock in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Pickup or delivery, carried alongside the order but outside its key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderContext {
    pub order_type: OrderType,
    pub delivery: Option<DeliveryDetails>,
}

impl OrderContext {
    pub fn pickup() -> Self {
        Self::default()
    }

    pub fn delivery(details: DeliveryDetails) -> Self {
        Self {
            order_type: OrderType::Delivery,
            delivery: Some(details),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Canonical record returned by the store
    Placed(Order),
    /// Another submission was in flight; nothing was sent
    Ignored,
}

/// Releases the in-flight flag on drop, whatever the outcome
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct OrderSubmitter {
    store: Arc<dyn OrderStore>,
    device: DeviceId,
    clock: Arc<dyn Clock>,
    window_ms: u64,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for OrderSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSubmitter")
            .field("device", &self.device)
            .field("window_ms", &self.window_ms)
            .field("in_flight", &self.is_submitting())
            .finish_non_exhaustive()
    }
}

impl OrderSubmitter {
    pub fn new(store: Arc<dyn OrderStore>, device: DeviceId) -> Self {
        Self {
            store,
            device,
            clock: Arc::new(SystemClock),
            window_ms: DEFAULT_WINDOW_MS,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms.max(1);
        self
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Whether a submission currently holds the guard
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Check preconditions without touching the guard or the network
    pub fn validate(
        items: &[OrderLine],
        total: Decimal,
        payment_method: Option<PaymentMethod>,
    ) -> Result<PaymentMethod, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        let method = payment_method.ok_or(ValidationError::MissingPaymentMethod)?;
        for line in items {
            if line.quantity == 0 || line.quantity > money::MAX_QUANTITY {
                return Err(ValidationError::InvalidQuantity(line.id.clone()));
            }
            if line.price.is_sign_negative() || line.price > money::MAX_PRICE {
                return Err(ValidationError::InvalidPrice(line.id.clone()));
            }
        }
        if total <= Decimal::ZERO {
            return Err(ValidationError::InvalidTotal);
        }
        let computed = money::sum_lines(items.iter().map(|l| (l.price, l.quantity)));
        if total != computed {
            return Err(ValidationError::TotalMismatch);
        }
        Ok(method)
    }

    /// Submit one order
    ///
    /// Returns [`SubmitOutcome::Ignored`] when another call is in flight.
    /// Validation failures never reach the store. The guard is released on
    /// every exit path.
    pub async fn submit(
        &self,
        items: Vec<OrderLine>,
        total: Decimal,
        payment_method: Option<PaymentMethod>,
        context: OrderContext,
    ) -> Result<SubmitOutcome, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Submission already in flight, ignoring");
            return Ok(SubmitOutcome::Ignored);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let method = Self::validate(&items, total, payment_method)?;

        let key = IdempotencyKey::derive(
            &self.device,
            method,
            total,
            self.clock.now_ms(),
            self.window_ms,
        );
        let (customer_name, delivery_location) = match (&context.order_type, context.delivery) {
            (OrderType::Delivery, Some(details)) => (Some(details.name), Some(details.location)),
            _ => (None, None),
        };
        let request = OrderRequest {
            device_id: self.device.to_string(),
            items,
            total,
            payment_method: method,
            idempotency_key: key.into_string(),
            order_type: context.order_type,
            customer_name,
            delivery_location,
        };

        match self.store.upsert_order(&request).await {
            Ok(order) => {
                tracing::info!(
                    order_id = order.id,
                    idempotency_key = %request.idempotency_key,
                    total = %money::format_amount(order.total),
                    "Order placed"
                );
                Ok(SubmitOutcome::Placed(order))
            }
            Err(e) => {
                tracing::warn!(
                    idempotency_key = %request.idempotency_key,
                    error = %e,
                    "Order submission failed"
                );
                Err(OrderSubmissionError::from(e).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::remote::InMemoryOrderStore;
    use std::sync::atomic::AtomicI64;

    struct FixedClock(AtomicI64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn espresso(qty: u32) -> Vec<OrderLine> {
        vec![OrderLine {
            id: "espresso".into(),
            quantity: qty,
            name: "item_espresso".into(),
            price: Decimal::from(8),
        }]
    }

    fn submitter(store: Arc<InMemoryOrderStore>, clock: Arc<FixedClock>) -> OrderSubmitter {
        OrderSubmitter::new(store, DeviceId::from("dev-1")).with_clock(clock)
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(
            OrderSubmitter::validate(&[], Decimal::ZERO, None),
            Err(ValidationError::EmptyCart)
        );
        assert_eq!(
            OrderSubmitter::validate(&espresso(1), Decimal::from(8), None),
            Err(ValidationError::MissingPaymentMethod)
        );
        assert_eq!(
            OrderSubmitter::validate(&espresso(1), Decimal::ZERO, Some(PaymentMethod::Cash)),
            Err(ValidationError::InvalidTotal)
        );
        assert_eq!(
            OrderSubmitter::validate(&espresso(1), Decimal::from(9), Some(PaymentMethod::Cash)),
            Err(ValidationError::TotalMismatch)
        );
        assert_eq!(
            OrderSubmitter::validate(&espresso(2), Decimal::from(16), Some(PaymentMethod::Pix)),
            Ok(PaymentMethod::Pix)
        );
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_store() {
        let store = Arc::new(InMemoryOrderStore::new());
        let sub = submitter(store.clone(), Arc::new(FixedClock(AtomicI64::new(0))));

        let err = sub
            .submit(vec![], Decimal::ZERO, Some(PaymentMethod::Cash), OrderContext::pickup())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
        assert_eq!(store.write_count(), 0);
        assert!(!sub.is_submitting());
    }

    #[test]
    fn test_validate_line_limits() {
        assert_eq!(
            OrderSubmitter::validate(&espresso(0), Decimal::ZERO, Some(PaymentMethod::Cash)),
            Err(ValidationError::InvalidQuantity("espresso".into()))
        );
        let pricey = vec![OrderLine {
            id: "espresso".into(),
            quantity: 1,
            name: "item_espresso".into(),
            price: money::MAX_PRICE + Decimal::ONE,
        }];
        let total = money::MAX_PRICE + Decimal::ONE;
        assert_eq!(
            OrderSubmitter::validate(&pricey, total, Some(PaymentMethod::Pix)),
            Err(ValidationError::InvalidPrice("espresso".into()))
        );
    }

    #[tokio::test]
    async fn test_oversized_quantity_never_reaches_store() {
        let store = Arc::new(InMemoryOrderStore::new());
        let sub = submitter(store.clone(), Arc::new(FixedClock(AtomicI64::new(0))));

        let err = sub
            .submit(
                espresso(10_000),
                Decimal::from(80_000),
                Some(PaymentMethod::Cash),
                OrderContext::pickup(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::InvalidQuantity(ref id)) if id == "espresso"
        ));
        assert_eq!(store.write_count(), 0);
        assert!(!sub.is_submitting());
    }

    #[tokio::test]
    async fn test_bucket_dedup_law() {
        let store = Arc::new(InMemoryOrderStore::new());
        let clock = Arc::new(FixedClock(AtomicI64::new(10_000)));
        let sub = submitter(store.clone(), clock.clone());

        let place = || {
            sub.submit(
                espresso(2),
                Decimal::from(16),
                Some(PaymentMethod::Cash),
                OrderContext::pickup(),
            )
        };

        let SubmitOutcome::Placed(first) = place().await.unwrap() else {
            panic!("expected placed");
        };
        clock.0.store(11_500, Ordering::SeqCst);
        let SubmitOutcome::Placed(same) = place().await.unwrap() else {
            panic!("expected placed");
        };
        clock.0.store(12_000, Ordering::SeqCst);
        let SubmitOutcome::Placed(next) = place().await.unwrap() else {
            panic!("expected placed");
        };

        assert_eq!(first.id, same.id);
        assert_ne!(first.id, next.id);
        assert_eq!(store.order_count(), 2);
    }

    #[tokio::test]
    async fn test_delivery_fields_sent() {
        let store = Arc::new(InMemoryOrderStore::new());
        let sub = submitter(store.clone(), Arc::new(FixedClock(AtomicI64::new(0))));
        let details = DeliveryDetails::new("Ana", "Sala 12").unwrap();

        let outcome = sub
            .submit(
                espresso(1),
                Decimal::from(8),
                Some(PaymentMethod::Pix),
                OrderContext::delivery(details),
            )
            .await
            .unwrap();
        let SubmitOutcome::Placed(order) = outcome else {
            panic!("expected placed");
        };

        let row = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(row.order_type, OrderType::Delivery);
        assert_eq!(row.customer_name.as_deref(), Some("Ana"));
        assert_eq!(row.delivery_location.as_deref(), Some("Sala 12"));
        assert!(row.idempotency_key.starts_with("dev-1:pix:8:"));
    }
}
