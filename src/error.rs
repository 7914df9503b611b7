//! Crate error type

use thiserror::Error;

/// Errors surfaced by the generator contract and file IO
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed a value outside a fixed enumeration or format
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
