//! Error types for the controller subsystem.

use std::net::SocketAddr;

use shared_types::NodeId;
use thiserror::Error;

/// Fatal controller errors.
///
/// Only startup can fail; once running, a controller logs and continues.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Controller {node_id} failed to bind {addr}: {reason}")]
    BindFailed {
        node_id: NodeId,
        addr: SocketAddr,
        reason: String,
    },
}

/// Errors sending a single token to a single peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection to {peer} timed out after {attempts} attempt(s)")]
    ConnectTimeout { peer: SocketAddr, attempts: u32 },

    #[error("Connection to {peer} failed after {attempts} attempt(s): {reason}")]
    ConnectFailed {
        peer: SocketAddr,
        attempts: u32,
        reason: String,
    },

    #[error("Send to {peer} failed: {reason}")]
    SendFailed { peer: SocketAddr, reason: String },
}

impl TransportError {
    /// The peer this error concerns.
    pub fn peer(&self) -> SocketAddr {
        match self {
            TransportError::ConnectTimeout { peer, .. }
            | TransportError::ConnectFailed { peer, .. }
            | TransportError::SendFailed { peer, .. } => *peer,
        }
    }
}
