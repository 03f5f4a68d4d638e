//! # Core Domain Entities
//!
//! ## Entities
//!
//! - [`NodeId`]: Identifier of a logical node (controller)
//! - [`ControllerState`]: Lifecycle of a controller in the flood
//! - [`ProcessingRecord`]: Unit of work pushed into the supervisor intake

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a logical node. Ids are contiguous `0..N-1` within a run.
pub type NodeId = u32;

/// Root node of every topology (depth 0).
pub const ROOT_NODE: NodeId = 0;

/// Lifecycle state of a controller.
///
/// ```text
/// Idle ──first FLOOD──→ Done
/// Initiator ──FLOOD──→ Done
/// ```
///
/// `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControllerState {
    /// Waiting for the first flood marker.
    #[default]
    Idle,
    /// Designated to start the wave when it receives its own flood marker.
    Initiator,
    /// Has forwarded the flood; ignores everything from now on.
    Done,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Idle => "IDLE",
            ControllerState::Initiator => "INITIATOR",
            ControllerState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// A record of one processed (or synthetically sent) message.
///
/// Produced by a synthetic sender or by a controller after it handled an
/// inbound event; consumed exactly once by the supervisor drain loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    /// Node that produced the message.
    pub sender_id: NodeId,
    /// Node the message is attributed to. Its depth is the record's unit time.
    pub receiver_id: NodeId,
    /// Human readable message or raw event token.
    pub message: String,
    /// Wall-clock time the record was produced.
    pub timestamp: DateTime<Utc>,
}

impl ProcessingRecord {
    /// Creates a record stamped with the current time.
    pub fn new(sender_id: NodeId, receiver_id: NodeId, message: impl Into<String>) -> Self {
        Self {
            sender_id,
            receiver_id,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Record emitted by a controller after processing an inbound event.
    ///
    /// Controllers attribute the record to themselves on both ends.
    pub fn processed_by(controller_id: NodeId, token: impl Into<String>) -> Self {
        Self::new(controller_id, controller_id, token)
    }

    /// Record emitted by a synthetic sender along a topology edge.
    pub fn synthetic(sender_id: NodeId, receiver_id: NodeId) -> Self {
        Self::new(
            sender_id,
            receiver_id,
            format!("Message from Controller {} to Controller {}", sender_id, receiver_id),
        )
    }
}

impl fmt::Display for ProcessingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{sender: {}, receiver: {}, message: {:?}, timestamp: {}}}",
            self.sender_id,
            self.receiver_id,
            self.message,
            self.timestamp.to_rfc3339()
        )
    }
}
