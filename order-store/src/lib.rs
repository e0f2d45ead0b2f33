//! Java Joy Order Store
//!
//! # Overview
//!
//! The order store is the single writer of café orders. Kiosks upsert
//! orders keyed by an idempotency key; the store assigns a sequential id
//! and the creation time, and publishes a change notification after each
//! committed write.
//!
//! - **Storage** (`orders::storage`): redb tables for orders, idempotency keys and counters
//! - **Service** (`orders::service`): validation, upsert, change broadcast
//! - **HTTP API** (`api`): upsert, lookup, recent list, SSE change feed
//!
//! # Layout
//!
//! ```text
//! order-store/src/
//! ├── core/          # config, state, errors, server
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # storage and service
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod utils;

// Re-exports
pub use core::{Config, Server, ServerError, ServerState};
pub use orders::{OrderStorage, OrdersService};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, make sure the work directory exists and start logging
pub fn setup_environment() -> Result<Config, ServerError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
     __                        __
    / /___ __   ______ _      / /___  __  __
 __/ / __ `/ | / / __ `/ __  / / __ \/ / / /
/ /_/ / /_/ /| |/ / /_/ / / /_/ / /_/ / /_/ /
\____/\__,_/ |___/\__,_/  \____/\____/\__, /
              order store            /____/
    "#
    );
}
