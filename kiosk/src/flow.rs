//! Screen/Flow Controller
//!
//! ```text
//! hero ──start──▶ main ──checkout──▶ delivery_options ──pickup / delivery──▶ payment
//!                  ▲                                                          │
//!                  └──────────────────────── new order ───────────────────────┘
//! ```
//!
//! Cart and history overlays open and close independently of the screen.

use std::fmt;
use std::str::FromStr;

use shared::models::{DeliveryDetails, Order, OrderType, PaymentMethod};

use crate::error::FlowError;
use crate::orders::OrderContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Hero,
    Main,
    DeliveryOptions,
    Payment,
}

impl Screen {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Screen::Hero => "hero",
            Screen::Main => "main",
            Screen::DeliveryOptions => "delivery_options",
            Screen::Payment => "payment",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    pub const fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt" => Ok(Language::Pt),
            "en" => Ok(Language::En),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Cart,
    History,
}

#[derive(Debug, Clone, Default)]
pub struct FlowController {
    screen: Screen,
    language: Language,
    cart_open: bool,
    history_open: bool,
    order_type: OrderType,
    delivery: Option<DeliveryDetails>,
    payment_method: Option<PaymentMethod>,
    placed: Option<Order>,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn delivery(&self) -> Option<&DeliveryDetails> {
        self.delivery.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// The order shown on the payment screen once placed
    pub fn placed_order(&self) -> Option<&Order> {
        self.placed.as_ref()
    }

    fn require(&self, screen: Screen, action: &'static str) -> Result<(), FlowError> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                screen: self.screen,
                action,
            })
        }
    }

    /// Hero → main with the chosen language
    pub fn start(&mut self, language: Language) -> Result<(), FlowError> {
        self.require(Screen::Hero, "start")?;
        self.language = language;
        self.screen = Screen::Main;
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn open(&mut self, overlay: Overlay) {
        self.set_overlay(overlay, true);
    }

    pub fn close(&mut self, overlay: Overlay) {
        self.set_overlay(overlay, false);
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Cart => self.cart_open,
            Overlay::History => self.history_open,
        }
    }

    fn set_overlay(&mut self, overlay: Overlay, open: bool) {
        match overlay {
            Overlay::Cart => self.cart_open = open,
            Overlay::History => self.history_open = open,
        }
    }

    /// Main → delivery options; closes the cart overlay
    pub fn checkout(&mut self, cart_is_empty: bool) -> Result<(), FlowError> {
        self.require(Screen::Main, "check out")?;
        if cart_is_empty {
            return Err(FlowError::EmptyCart);
        }
        self.cart_open = false;
        self.screen = Screen::DeliveryOptions;
        Ok(())
    }

    /// Delivery options → payment as a pickup order
    pub fn choose_pickup(&mut self) -> Result<(), FlowError> {
        self.require(Screen::DeliveryOptions, "choose pickup")?;
        self.order_type = OrderType::Pickup;
        self.delivery = None;
        self.screen = Screen::Payment;
        Ok(())
    }

    /// Delivery options → payment once name and location are filled in
    pub fn confirm_delivery(&mut self, name: &str, location: &str) -> Result<(), FlowError> {
        self.require(Screen::DeliveryOptions, "confirm delivery")?;
        let details = DeliveryDetails::new(name, location)
            .map_err(|e| FlowError::DeliveryDetails(e.message))?;
        self.order_type = OrderType::Delivery;
        self.delivery = Some(details);
        self.screen = Screen::Payment;
        Ok(())
    }

    /// One step back, never out of a placed order
    pub fn back(&mut self) -> Result<(), FlowError> {
        match self.screen {
            Screen::DeliveryOptions => self.screen = Screen::Main,
            Screen::Payment if self.placed.is_none() => self.screen = Screen::DeliveryOptions,
            Screen::Payment => return Err(FlowError::OrderAlreadyPlaced),
            screen => {
                return Err(FlowError::InvalidTransition {
                    screen,
                    action: "go back",
                });
            }
        }
        Ok(())
    }

    /// Select a payment method; ignored once the order is placed
    pub fn select_payment(&mut self, method: PaymentMethod) -> bool {
        if self.placed.is_some() {
            tracing::debug!(method = %method, "Payment method change ignored after placement");
            return false;
        }
        self.payment_method = Some(method);
        true
    }

    /// Pickup/delivery choice for the submission
    pub fn order_context(&self) -> OrderContext {
        OrderContext {
            order_type: self.order_type,
            delivery: self.delivery.clone(),
        }
    }

    /// Check the payment screen may submit
    pub fn ensure_can_place(&self) -> Result<(), FlowError> {
        self.require(Screen::Payment, "place an order")?;
        if self.placed.is_some() {
            return Err(FlowError::OrderAlreadyPlaced);
        }
        Ok(())
    }

    /// Record the store's canonical order; the method shown is the stored one
    pub fn order_placed(&mut self, order: Order) {
        self.payment_method = Some(order.payment_method);
        self.placed = Some(order);
    }

    /// Payment → main, resetting the order context
    pub fn new_order(&mut self) -> Result<(), FlowError> {
        self.require(Screen::Payment, "start a new order")?;
        self.placed = None;
        self.delivery = None;
        self.order_type = OrderType::Pickup;
        self.payment_method = None;
        self.cart_open = false;
        self.screen = Screen::Main;
        Ok(())
    }
}
