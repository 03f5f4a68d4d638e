//! Configuration and reporting value objects for the controller.

use std::net::SocketAddr;
use std::time::Duration;

use shared_types::{ControllerState, NodeId, MAX_MESSAGE_BYTES};

/// Controller configuration.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Logical node id.
    pub node_id: NodeId,
    /// Address the inbound endpoint binds to.
    pub address: SocketAddr,
    /// Whether this controller starts the wave.
    pub initiator: bool,
    /// Upper bound on reading one inbound message.
    pub read_timeout: Duration,
    /// Maximum bytes read from one inbound connection.
    pub max_message_bytes: usize,
}

impl ControllerConfig {
    pub fn new(node_id: NodeId, address: SocketAddr) -> Self {
        Self {
            node_id,
            address,
            initiator: false,
            read_timeout: Duration::from_secs(2),
            max_message_bytes: MAX_MESSAGE_BYTES,
        }
    }

    /// Builder method: mark as the initiator.
    pub fn with_initiator(mut self, initiator: bool) -> Self {
        self.initiator = initiator;
        self
    }

    /// Builder method: set the read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// State the controller starts in.
    pub fn initial_state(&self) -> ControllerState {
        if self.initiator {
            ControllerState::Initiator
        } else {
            ControllerState::Idle
        }
    }
}

/// Connect-timeout and retry policy for one outbound send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendPolicy {
    /// Timeout for a single connect attempt.
    pub connect_timeout: Duration,
    /// Total attempts per peer (at least 1).
    pub max_attempts: u32,
    /// Pause between attempts.
    pub retry_backoff: Duration,
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(500),
            max_attempts: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl SendPolicy {
    /// Single attempt, no retry.
    pub fn no_retry(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            max_attempts: 1,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Result of one fan-out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers that received the token.
    pub delivered: Vec<SocketAddr>,
    /// Peers the token could not be delivered to.
    pub failed: Vec<SocketAddr>,
}

/// What happened to one inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventOutcome {
    pub transition: crate::domain::Transition,
    /// Present when the event triggered the fan-out.
    pub broadcast: Option<BroadcastReport>,
}

/// Counters for one controller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub node_id: NodeId,
    pub state: ControllerState,
    /// Inbound connections that carried a payload.
    pub events_processed: u64,
    /// Of those, how many carried the flood marker.
    pub floods_received: u64,
    /// Fan-outs performed (0 or 1).
    pub broadcasts: u64,
    /// Tokens delivered to peers.
    pub peer_deliveries: u64,
    /// Peers a token could not be delivered to.
    pub peer_failures: u64,
    /// Records accepted by the supervisor intake.
    pub records_reported: u64,
    /// Records the intake refused.
    pub report_failures: u64,
}

impl ControllerStats {
    pub fn new(node_id: NodeId, state: ControllerState) -> Self {
        Self {
            node_id,
            state,
            ..Default::default()
        }
    }
}
