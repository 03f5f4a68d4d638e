//! Outbound transport adapters.

mod tcp;

pub use tcp::TcpPeerTransport;
