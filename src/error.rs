//! Error types for slotstore
//!
//! Provides a unified error type for all store operations.
//!
//! Decode misses (end-of-file, truncated slot, unknown tag) are not errors:
//! they surface as `Ok(None)` / `Ok(false)` from the read path.

use thiserror::Error;

/// Result type alias using SlotError
pub type Result<T> = std::result::Result<T, SlotError>;

/// Unified error type for slotstore operations
#[derive(Debug, Error)]
pub enum SlotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Path Errors
    // -------------------------------------------------------------------------
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // -------------------------------------------------------------------------
    // Slot Errors
    // -------------------------------------------------------------------------
    #[error("Invalid slot index {0}: indices start at 1")]
    InvalidIndex(u32),

    #[error("Slot {index} is already occupied")]
    SlotOccupied { index: u32 },

    #[error("Encoded record is {size} bytes but the slot stride is {stride}")]
    ValueTooLarge { size: usize, stride: u32 },

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Value cannot be encoded: {0}")]
    Unencodable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for SlotError {
    fn from(err: bincode::Error) -> Self {
        SlotError::Serialization(err.to_string())
    }
}
