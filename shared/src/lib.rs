//! Shared types for Java Joy
//!
//! Types exchanged between the kiosk client and the order store:
//! menu model, order wire types, local history entries, the unified
//! error system and decimal money helpers.

pub mod error;
pub mod models;
pub mod money;

// Re-exports
pub use axum::Json;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
