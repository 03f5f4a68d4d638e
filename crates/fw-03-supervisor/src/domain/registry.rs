//! Registry of open start-endpoint connections.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Identifier handed out per accepted connection.
pub type ConnectionId = u64;

/// Connection id → remote address.
///
/// Reads and writes go through the same lock. The handler that registered an
/// entry removes it; anyone else must expect it to be gone.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: RwLock<HashMap<ConnectionId, SocketAddr>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, remote: SocketAddr) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.write().insert(id, remote);
        id
    }

    pub fn remove(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.connections.write().remove(&id)
    }

    /// `None` means the peer already disconnected.
    pub fn get(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.connections.read().get(&id).copied()
    }

    /// Connections currently open.
    pub(crate) fn len(&self) -> usize {
        self.connections.read().len()
    }
}
