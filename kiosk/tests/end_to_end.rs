//! Kiosk against a real order-store router on an ephemeral port

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use kiosk::menu::builtin_menu;
use kiosk::{
    Clock, HttpOrderStore, Kiosk, KioskConfig, Language, MemoryLocalStore, OrderStore,
    RemoteError, SubmitOutcome,
};
use order_store::{Config, ServerState, api};
use rust_decimal::Decimal;
use shared::ErrorCode;
use shared::models::{OrderLine, OrderRequest, OrderType, PaymentMethod};
use tempfile::TempDir;

struct FixedClock(AtomicI64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Start the order store on 127.0.0.1:0 and return its base URL
async fn spawn_order_store() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).unwrap();
    let app = api::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (dir, format!("http://{}", addr))
}

fn kiosk(base_url: &str, clock: Arc<FixedClock>) -> Kiosk {
    let config = KioskConfig::with_overrides(base_url, "./unused");
    let remote = Arc::new(HttpOrderStore::new(base_url).unwrap());
    Kiosk::new(
        config,
        builtin_menu().unwrap(),
        Arc::new(MemoryLocalStore::new()),
        remote,
    )
    .with_clock(clock)
}

#[tokio::test]
async fn places_order_over_http() {
    let (_dir, url) = spawn_order_store().await;
    let kiosk = kiosk(&url, Arc::new(FixedClock(AtomicI64::new(1_700_000_000_000))));

    kiosk.start(Language::Pt).unwrap();
    kiosk.add_to_cart("espresso", None);
    kiosk.add_to_cart("espresso", None);
    kiosk.checkout().unwrap();
    kiosk.confirm_delivery("Ana", "Biblioteca").unwrap();
    kiosk.select_payment_method("pix").unwrap();

    let SubmitOutcome::Placed(order) = kiosk.place_order().await.unwrap() else {
        panic!("expected a placed order");
    };
    assert_eq!(order.id, 1);
    assert_eq!(order.total, Decimal::from(16));
    assert_eq!(order.payment_method, PaymentMethod::Pix);
    assert_eq!(kiosk.history()[0].id, 1);

    let store = HttpOrderStore::new(&url).unwrap();
    let row = store.get_order(1).await.unwrap().unwrap();
    assert_eq!(row.order_type, OrderType::Delivery);
    assert_eq!(row.customer_name.as_deref(), Some("Ana"));
    assert_eq!(row.delivery_location.as_deref(), Some("Biblioteca"));
    assert_eq!(row.device_id, kiosk.device_id().as_str());

    assert!(store.get_order(999).await.unwrap().is_none());
}

#[tokio::test]
async fn same_bucket_reuses_remote_order() {
    let (_dir, url) = spawn_order_store().await;
    let clock = Arc::new(FixedClock(AtomicI64::new(50_000)));
    let kiosk = kiosk(&url, clock.clone());
    kiosk.start(Language::En).unwrap();

    let mut ids = Vec::new();
    for at in [50_000, 51_000, 52_000] {
        clock.0.store(at, Ordering::SeqCst);
        kiosk.add_to_cart("water", None);
        kiosk.checkout().unwrap();
        kiosk.choose_pickup().unwrap();
        kiosk.select_payment_method("cash").unwrap();
        match kiosk.place_order().await.unwrap() {
            SubmitOutcome::Placed(order) => ids.push(order.id),
            SubmitOutcome::Ignored => panic!("nothing was in flight"),
        }
        kiosk.new_order().unwrap();
    }

    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_eq!(kiosk.history().len(), 2);

    let store = HttpOrderStore::new(&url).unwrap();
    let recent = store.list_recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, ids[2]);
}

#[tokio::test]
async fn rejection_decoded_from_envelope() {
    let (_dir, url) = spawn_order_store().await;
    let store = HttpOrderStore::new(&url).unwrap();

    let request = OrderRequest {
        device_id: "dev-e2e".into(),
        items: vec![OrderLine {
            id: "cupcake".into(),
            quantity: 2,
            name: "item_cupcake".into(),
            price: Decimal::from(9),
        }],
        total: Decimal::from(20),
        payment_method: PaymentMethod::Cash,
        idempotency_key: "dev-e2e:cash:20:1".into(),
        order_type: OrderType::Pickup,
        customer_name: None,
        delivery_location: None,
    };

    match store.upsert_order(&request).await {
        Err(RemoteError::Rejected { code, .. }) => assert_eq!(code, ErrorCode::OrderTotalMismatch),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_store_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let kiosk = kiosk(
        &format!("http://{}", addr),
        Arc::new(FixedClock(AtomicI64::new(0))),
    );
    kiosk.start(Language::Pt).unwrap();
    kiosk.add_to_cart("chocoki", None);
    kiosk.checkout().unwrap();
    kiosk.choose_pickup().unwrap();
    kiosk.select_payment_method("cash").unwrap();

    let err = kiosk.place_order().await.unwrap_err();
    assert!(err.user_message().starts_with("Order error: Network error"));
    assert_eq!(kiosk.cart().len(), 1);
}
