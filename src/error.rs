//! Error types for anchorlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AnchorError
pub type Result<T> = std::result::Result<T, AnchorError>;

/// Unified error type for anchorlog operations
#[derive(Debug, Error)]
pub enum AnchorError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lock Errors
    // -------------------------------------------------------------------------
    #[error("Lock error: {0}")]
    Lock(String),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Address {address} out of range: {reason}")]
    OutOfRange {
        /// The offending store offset
        address: u64,
        /// Why the address is invalid
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
