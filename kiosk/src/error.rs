//! Kiosk error types
//!
//! | Error | Raised by | Surfaces to user |
//! |-------|-----------|------------------|
//! | [`ValidationError`] | submit preconditions | yes, before any network call |
//! | [`OrderSubmissionError`] | order store round trip | yes, cart kept |
//! | [`HistoryError`] | history mirror | no, logged and swallowed |
//! | [`FlowError`] | screen transitions | yes |

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::flow::Screen;

/// Precondition failures detected before any network call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Select a payment method")]
    MissingPaymentMethod,

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Quantity of {0} is out of range")]
    InvalidQuantity(String),

    #[error("Price of {0} is out of range")]
    InvalidPrice(String),

    #[error("Cart total is invalid")]
    InvalidTotal,

    #[error("Cart total does not match items")]
    TotalMismatch,
}

impl ValidationError {
    /// Shared error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyCart => ErrorCode::OrderEmpty,
            ValidationError::MissingPaymentMethod => ErrorCode::PaymentMethodRequired,
            ValidationError::UnknownPaymentMethod(_) => ErrorCode::PaymentMethodUnknown,
            ValidationError::InvalidQuantity(_) => ErrorCode::InvalidQuantity,
            ValidationError::InvalidPrice(_) => ErrorCode::ValueOutOfRange,
            ValidationError::InvalidTotal => ErrorCode::InvalidAmount,
            ValidationError::TotalMismatch => ErrorCode::OrderTotalMismatch,
        }
    }
}

/// Failures talking to the order store
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with an error envelope
    #[error("{message}")]
    Rejected { code: ErrorCode, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl From<AppError> for RemoteError {
    fn from(err: AppError) -> Self {
        RemoteError::Rejected {
            code: err.code,
            message: err.message,
        }
    }
}

/// The order store round trip failed; the cart is left untouched
#[derive(Debug, Clone, Error)]
#[error("Order error: {source}")]
pub struct OrderSubmissionError {
    #[from]
    pub source: RemoteError,
}

/// Anything `place_order` can refuse with
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] OrderSubmissionError),

    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl CheckoutError {
    /// Message suitable for an alert
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Screen transition refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot {action} on the {screen} screen")]
    InvalidTransition { screen: Screen, action: &'static str },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{0}")]
    DeliveryDetails(String),

    #[error("Order already placed")]
    OrderAlreadyPlaced,
}

/// Local key-value storage failures
#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Local store unavailable: {0}")]
    Unavailable(String),
}

/// History mirror failures, never shown to the user
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Local store error: {0}")]
    Store(#[from] LocalStoreError),

    #[error("History is not a valid entry list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to assemble a [`crate::Kiosk`] from configuration
#[derive(Debug, Error)]
pub enum KioskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Local store error: {0}")]
    LocalStore(#[from] LocalStoreError),

    #[error("Menu error: {0}")]
    Menu(#[from] AppError),

    #[error("Order store client error: {0}")]
    Remote(#[from] RemoteError),
}
