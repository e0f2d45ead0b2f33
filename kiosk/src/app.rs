//! Kiosk facade
//!
//! The object a UI holds: one cart, one flow, one submitter, one history.
//! Locks are never held across the network round trip.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::models::{Menu, Order, OrderHistoryEntry, PaymentMethod};

use crate::cart::{Cart, CartTotals};
use crate::config::KioskConfig;
use crate::device::DeviceId;
use crate::error::{CheckoutError, FlowError, KioskError, ValidationError};
use crate::flow::{FlowController, Language, Overlay, Screen};
use crate::history::OrderHistory;
use crate::inventory::InventoryMirror;
use crate::menu::builtin_menu;
use crate::orders::{Clock, HttpOrderStore, OrderStore, OrderSubmitter, SubmitOutcome};
use crate::storage::{LocalStore, RedbLocalStore};

pub struct Kiosk {
    config: KioskConfig,
    menu: Menu,
    inventory: Arc<InventoryMirror>,
    cart: Mutex<Cart>,
    flow: Mutex<FlowController>,
    submitter: OrderSubmitter,
    history: OrderHistory,
}

impl std::fmt::Debug for Kiosk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kiosk")
            .field("config", &self.config)
            .field("submitter", &self.submitter)
            .finish_non_exhaustive()
    }
}

impl Kiosk {
    /// Built-in menu, redb local store under `data_dir`, HTTP order store
    pub fn open(config: KioskConfig) -> Result<Self, KioskError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let local: Arc<dyn LocalStore> = Arc::new(RedbLocalStore::open(config.local_db_path())?);
        let remote: Arc<dyn OrderStore> = Arc::new(HttpOrderStore::new(&config.order_store_url)?);
        let menu = builtin_menu()?;
        tracing::info!(
            order_store = %config.order_store_url,
            data_dir = %config.data_dir,
            "Kiosk opened"
        );
        Ok(Self::new(config, menu, local, remote))
    }

    /// Assemble from explicit collaborators
    pub fn new(
        config: KioskConfig,
        menu: Menu,
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn OrderStore>,
    ) -> Self {
        let device = DeviceId::load_or_create(local.as_ref());
        let submitter =
            OrderSubmitter::new(remote, device).with_window_ms(config.idempotency_window_ms);
        let history = OrderHistory::with_limit(local.clone(), config.history_limit);
        let inventory = Arc::new(InventoryMirror::load(local));
        Self {
            config,
            menu,
            inventory,
            cart: Mutex::new(Cart::new()),
            flow: Mutex::new(FlowController::new()),
            submitter,
            history,
        }
    }

    /// Replace the submitter's clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.submitter = self.submitter.with_clock(clock);
        self
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn inventory(&self) -> &Arc<InventoryMirror> {
        &self.inventory
    }

    pub fn device_id(&self) -> &DeviceId {
        self.submitter.device()
    }

    /// Static PIX key shown on the payment screen
    pub fn pix_key(&self) -> &str {
        &self.config.pix_key
    }

    // ========== Cart ==========

    /// Add one unit; false when the item is unknown or unavailable
    pub fn add_to_cart(&self, item_id: &str, option_key: Option<&str>) -> bool {
        let Some(item) = self.menu.find_item(item_id) else {
            tracing::warn!(item_id, "Add to cart: unknown item");
            return false;
        };
        if !self.inventory.is_available(item_id) {
            tracing::debug!(item_id, "Add to cart: item unavailable");
            return false;
        }
        self.cart.lock().add_item(item, option_key);
        true
    }

    pub fn change_quantity(&self, line_id: &str, delta: i64) {
        self.cart.lock().change_quantity(line_id, delta);
    }

    pub fn cart(&self) -> Cart {
        self.cart.lock().clone()
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.lock().totals()
    }

    // ========== Flow ==========

    pub fn screen(&self) -> Screen {
        self.flow.lock().screen()
    }

    pub fn flow(&self) -> FlowController {
        self.flow.lock().clone()
    }

    pub fn start(&self, language: Language) -> Result<(), FlowError> {
        self.flow.lock().start(language)
    }

    pub fn set_language(&self, language: Language) {
        self.flow.lock().set_language(language);
    }

    pub fn open_overlay(&self, overlay: Overlay) {
        self.flow.lock().open(overlay);
    }

    pub fn close_overlay(&self, overlay: Overlay) {
        self.flow.lock().close(overlay);
    }

    pub fn checkout(&self) -> Result<(), FlowError> {
        let cart_is_empty = self.cart.lock().is_empty();
        self.flow.lock().checkout(cart_is_empty)
    }

    pub fn choose_pickup(&self) -> Result<(), FlowError> {
        self.flow.lock().choose_pickup()
    }

    pub fn confirm_delivery(&self, name: &str, location: &str) -> Result<(), FlowError> {
        self.flow.lock().confirm_delivery(name, location)
    }

    pub fn back(&self) -> Result<(), FlowError> {
        self.flow.lock().back()
    }

    /// Parse and select a payment method
    ///
    /// Unknown values are rejected; `Ok(false)` when the order is already placed.
    pub fn select_payment_method(&self, method: &str) -> Result<bool, ValidationError> {
        let method: PaymentMethod = method
            .parse()
            .map_err(|_| ValidationError::UnknownPaymentMethod(method.to_string()))?;
        Ok(self.flow.lock().select_payment(method))
    }

    /// Whether a submission is currently in flight
    pub fn is_submitting(&self) -> bool {
        self.submitter.is_submitting()
    }

    /// Submit the current cart with the selected payment method
    ///
    /// On success the cart is cleared, the flow shows the placed order and
    /// the history mirror gets the new entry. On failure nothing changes.
    pub async fn place_order(&self) -> Result<SubmitOutcome, CheckoutError> {
        let (method, context) = {
            let flow = self.flow.lock();
            flow.ensure_can_place()?;
            (flow.payment_method(), flow.order_context())
        };
        let (items, total) = {
            let cart = self.cart.lock();
            (cart.order_lines(), cart.totals().total_price)
        };

        let outcome = self.submitter.submit(items, total, method, context).await?;
        if let SubmitOutcome::Placed(order) = &outcome {
            self.cart.lock().clear();
            self.flow.lock().order_placed(order.clone());
            self.history.record_order(order);
        }
        Ok(outcome)
    }

    /// The order shown on the payment screen, once placed
    pub fn placed_order(&self) -> Option<Order> {
        self.flow.lock().placed_order().cloned()
    }

    /// Payment → main with an empty cart
    pub fn new_order(&self) -> Result<(), FlowError> {
        self.flow.lock().new_order()?;
        self.cart.lock().clear();
        Ok(())
    }

    // ========== History ==========

    pub fn history(&self) -> Vec<OrderHistoryEntry> {
        self.history.load()
    }
}
