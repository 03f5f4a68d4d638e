//! Error types for the supervisor subsystem.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Supervisor failed to bind {addr}: {reason}")]
    BindFailed { addr: SocketAddr, reason: String },
}
