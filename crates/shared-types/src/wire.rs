//! # Wire Tokens
//!
//! Controllers and the supervisor exchange single, length-implicit UTF-8
//! tokens: one connection carries one token and is closed right after.
//!
//! ```text
//! controller ──"I"──────→ controller     flood marker
//! harness    ──"/start"─→ supervisor     begin timing
//! ```

use crate::errors::WireError;
use std::fmt;

/// The flood marker exchanged between controllers.
pub const FLOOD_MARKER: &str = "I";

/// Token that starts the supervisor's wall clock.
pub const START_TOKEN: &str = "/start";

/// Maximum bytes read from a single inbound connection.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// A decoded controller event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloodEvent {
    /// The flood marker.
    Flood,
    /// Any other payload. Treated as a no-op by the state machine.
    Unrecognized(String),
}

impl FloodEvent {
    /// Decode a raw payload.
    ///
    /// Surrounding whitespace is ignored. Payloads that are not valid UTF-8
    /// are reported as [`WireError::InvalidUtf8`]; callers treat that as an
    /// unrecognized event.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.is_empty() {
            return Err(WireError::Empty);
        }
        if bytes.len() > MAX_MESSAGE_BYTES {
            return Err(WireError::TooLarge {
                size: bytes.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }
        let token = std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8)?;
        Ok(Self::from_token(token))
    }

    /// Decode a payload, mapping every decode error to `Unrecognized`.
    pub fn decode_lossy(bytes: &[u8]) -> Self {
        match Self::decode(bytes) {
            Ok(event) => event,
            Err(_) => FloodEvent::Unrecognized(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    fn from_token(token: &str) -> Self {
        match token.trim() {
            FLOOD_MARKER => FloodEvent::Flood,
            other => FloodEvent::Unrecognized(other.to_string()),
        }
    }

    /// Wire representation of this event.
    pub fn token(&self) -> &str {
        match self {
            FloodEvent::Flood => FLOOD_MARKER,
            FloodEvent::Unrecognized(raw) => raw,
        }
    }

    /// Encode for sending.
    pub fn encode(&self) -> Vec<u8> {
        self.token().as_bytes().to_vec()
    }

    pub fn is_flood(&self) -> bool {
        matches!(self, FloodEvent::Flood)
    }
}

impl fmt::Display for FloodEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// True if the payload contains the supervisor start token.
pub fn is_start_token(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|s| s.trim() == START_TOKEN)
        .unwrap_or(false)
}
