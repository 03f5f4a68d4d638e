//! # Error Types
//!
//! Defines error types shared across subsystems.

use thiserror::Error;

/// Errors decoding a wire token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The connection closed without sending anything.
    #[error("Empty payload")]
    Empty,

    /// The payload is not valid UTF-8.
    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,

    /// The payload exceeds the single-message limit.
    #[error("Payload too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}
