use crate::orders::StorageError;
use thiserror::Error;

/// Startup and runtime failures of the server process
///
/// Request-level failures are [`shared::AppError`]; this type only covers
/// what can stop the process.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
