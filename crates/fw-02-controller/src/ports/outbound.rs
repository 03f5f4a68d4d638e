//! Outbound ports (SPI) for the controller subsystem.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::errors::TransportError;

/// Delivers one token to one peer endpoint.
///
/// Implementations own their timeout and retry policy. A failure concerns
/// only that peer; the caller keeps going with the rest.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, peer: SocketAddr, payload: &[u8]) -> Result<(), TransportError>;
}
