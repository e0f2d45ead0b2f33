//! Utility module

pub mod logger;
