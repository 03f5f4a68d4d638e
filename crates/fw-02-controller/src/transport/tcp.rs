//! TCP adapter for [`PeerTransport`]: one short-lived connection per token.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::domain::SendPolicy;
use crate::errors::TransportError;
use crate::ports::outbound::PeerTransport;

/// Connect, write the whole token, close.
#[derive(Clone, Debug, Default)]
pub struct TcpPeerTransport {
    policy: SendPolicy,
}

impl TcpPeerTransport {
    pub fn new(policy: SendPolicy) -> Self {
        Self { policy }
    }

    async fn connect(&self, peer: SocketAddr) -> Result<TcpStream, TransportError> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            match timeout(self.policy.connect_timeout, TcpStream::connect(peer)).await {
                Ok(Ok(stream)) => return Ok(stream),
                Ok(Err(e)) => {
                    debug!(%peer, attempt, error = %e, "Connect failed");
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    debug!(%peer, attempt, "Connect timed out");
                    last_error = None;
                }
            }
            if attempt < attempts && !self.policy.retry_backoff.is_zero() {
                sleep(self.policy.retry_backoff).await;
            }
        }

        Err(match last_error {
            Some(reason) => TransportError::ConnectFailed {
                peer,
                attempts,
                reason,
            },
            None => TransportError::ConnectTimeout { peer, attempts },
        })
    }
}

#[async_trait]
impl PeerTransport for TcpPeerTransport {
    async fn send(&self, peer: SocketAddr, payload: &[u8]) -> Result<(), TransportError> {
        let mut stream = self.connect(peer).await?;

        let send_failed = |e: std::io::Error| TransportError::SendFailed {
            peer,
            reason: e.to_string(),
        };
        stream.write_all(payload).await.map_err(send_failed)?;
        stream.shutdown().await.map_err(send_failed)?;
        Ok(())
    }
}
