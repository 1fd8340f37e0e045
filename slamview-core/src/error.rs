//! Error types for slamview

use thiserror::Error;

/// Main error type for slamview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load asset {path}: {message}")]
    Asset { path: String, message: String },
}

/// Result type alias for slamview operations
pub type Result<T> = std::result::Result<T, Error>;
