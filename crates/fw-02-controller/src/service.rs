//! # Controller Service
//!
//! [`ControllerActor`] holds the protocol state and the outbound ports;
//! [`BoundController`] adds the listening socket and owns the accept loop.
//!
//! ## Lifecycle
//!
//! ```text
//! ControllerActor::new ──bind()──→ BoundController ──run()──→ ControllerStats
//!                                      │
//!                                      └─ set_peers() once every endpoint is bound
//! ```
//!
//! Inbound connections are handled strictly one at a time:
//! accept → read → decode → process → report, then the next accept.
//! Only the termination signal ends the loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_bus::RecordPublisher;
use shared_types::{ControllerState, FloodEvent, NodeId, ProcessingRecord};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::{
    BroadcastReport, ControllerConfig, ControllerStats, EventOutcome, FloodStateMachine,
};
use crate::errors::ControllerError;
use crate::ports::inbound::ControllerApi;
use crate::ports::outbound::PeerTransport;

/// A controller before its endpoint is bound.
pub struct ControllerActor<T, P>
where
    T: PeerTransport,
    P: RecordPublisher,
{
    config: ControllerConfig,
    machine: Mutex<FloodStateMachine>,
    /// Every other controller endpoint.
    peers: RwLock<Vec<SocketAddr>>,
    transport: Arc<T>,
    publisher: P,
    stats: RwLock<ControllerStats>,
    shutdown: watch::Receiver<bool>,
}

impl<T, P> ControllerActor<T, P>
where
    T: PeerTransport,
    P: RecordPublisher,
{
    pub fn new(
        config: ControllerConfig,
        peers: Vec<SocketAddr>,
        publisher: P,
        transport: Arc<T>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let state = config.initial_state();
        Self {
            machine: Mutex::new(FloodStateMachine::with_state(config.node_id, state)),
            stats: RwLock::new(ControllerStats::new(config.node_id, state)),
            peers: RwLock::new(peers),
            config,
            transport,
            publisher,
            shutdown,
        }
    }

    /// Replace the peer list.
    pub fn set_peers(&self, peers: Vec<SocketAddr>) {
        *self.peers.write() = peers;
    }

    pub fn peers(&self) -> Vec<SocketAddr> {
        self.peers.read().clone()
    }

    /// Open the inbound endpoint.
    pub async fn bind(self) -> Result<BoundController<T, P>, ControllerError> {
        let addr = self.config.address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ControllerError::BindFailed {
                node_id: self.config.node_id,
                addr,
                reason: e.to_string(),
            })?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| ControllerError::BindFailed {
                node_id: self.config.node_id,
                addr,
                reason: e.to_string(),
            })?;

        info!(
            "[fw-02] Controller {} listening on {}",
            self.config.node_id, local_addr
        );

        Ok(BoundController {
            listener,
            local_addr,
            actor: self,
        })
    }

    /// Send `event` to every peer. One peer failing never stops the rest.
    async fn broadcast(&self, event: &FloodEvent) -> BroadcastReport {
        let payload = event.encode();
        let peers = self.peers();
        let mut report = BroadcastReport::default();

        for peer in peers {
            match self.transport.send(peer, &payload).await {
                Ok(()) => {
                    debug!(node_id = self.config.node_id, %peer, "Flood delivered");
                    report.delivered.push(peer);
                }
                Err(e) => {
                    warn!(
                        "[fw-02] Controller {} could not reach {}: {}",
                        self.config.node_id, peer, e
                    );
                    report.failed.push(peer);
                }
            }
        }

        let mut stats = self.stats.write();
        stats.broadcasts += 1;
        stats.peer_deliveries += report.delivered.len() as u64;
        stats.peer_failures += report.failed.len() as u64;
        report
    }

    /// Handle one raw inbound payload and report it to the supervisor.
    ///
    /// Empty payloads are dropped without a record.
    pub async fn handle_payload(&self, bytes: &[u8]) -> Option<EventOutcome> {
        if bytes.is_empty() {
            debug!(node_id = self.config.node_id, "Empty payload skipped");
            return None;
        }

        let event = FloodEvent::decode_lossy(bytes);
        let token = event.token().to_string();
        let outcome = self.process_event(event).await;

        let record = ProcessingRecord::processed_by(self.config.node_id, token);
        match self.publisher.publish(record).await {
            Ok(()) => self.stats.write().records_reported += 1,
            Err(e) => {
                warn!(
                    "[fw-02] Controller {} could not report to supervisor: {}",
                    self.config.node_id, e
                );
                self.stats.write().report_failures += 1;
            }
        }

        Some(outcome)
    }

    /// One message is one read; the sender may keep the connection open.
    async fn read_message(&self, mut stream: TcpStream) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.config.max_message_bytes.max(1)];
        match timeout(self.config.read_timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(buf)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
        }
    }
}

#[async_trait]
impl<T, P> ControllerApi for ControllerActor<T, P>
where
    T: PeerTransport,
    P: RecordPublisher,
{
    fn node_id(&self) -> NodeId {
        self.config.node_id
    }

    fn state(&self) -> ControllerState {
        self.machine.lock().state()
    }

    async fn process_event(&self, event: FloodEvent) -> EventOutcome {
        let transition = {
            let mut machine = self.machine.lock();
            let transition = machine.process(&event);
            let mut stats = self.stats.write();
            stats.events_processed += 1;
            if event.is_flood() {
                stats.floods_received += 1;
            }
            stats.state = machine.state();
            transition
        };

        if !transition.should_broadcast() {
            debug!(node_id = self.config.node_id, %event, "Event ignored");
            return EventOutcome {
                transition,
                broadcast: None,
            };
        }

        if matches!(transition, crate::domain::Transition::Initiated) {
            info!("[fw-02] Controller {} initiating flood", self.config.node_id);
        } else {
            info!(
                "[fw-02] Controller {} received flood, forwarding",
                self.config.node_id
            );
        }

        let report = self.broadcast(&event).await;
        EventOutcome {
            transition,
            broadcast: Some(report),
        }
    }

    fn stats(&self) -> ControllerStats {
        self.stats.read().clone()
    }
}

/// A controller with its endpoint open, ready to run.
pub struct BoundController<T, P>
where
    T: PeerTransport,
    P: RecordPublisher,
{
    listener: TcpListener,
    local_addr: SocketAddr,
    actor: ControllerActor<T, P>,
}

impl<T, P> BoundController<T, P>
where
    T: PeerTransport,
    P: RecordPublisher,
{
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn actor(&self) -> &ControllerActor<T, P> {
        &self.actor
    }

    pub fn set_peers(&self, peers: Vec<SocketAddr>) {
        self.actor.set_peers(peers);
    }

    /// Accept until the termination signal is raised.
    pub async fn run(self) -> ControllerStats {
        let Self {
            listener, actor, ..
        } = self;
        let node_id = actor.config.node_id;
        let mut shutdown = actor.shutdown.clone();

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as termination.
                    if changed.is_err() {
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        debug!(node_id, %remote, "Connection accepted");
                        match actor.read_message(stream).await {
                            Ok(bytes) => {
                                actor.handle_payload(&bytes).await;
                            }
                            Err(e) => warn!(
                                "[fw-02] Controller {} failed to read from {}: {}",
                                node_id, remote, e
                            ),
                        }
                    }
                    Err(e) => warn!("[fw-02] Controller {} accept failed: {}", node_id, e),
                },
            }
        }

        let stats = actor.stats();
        info!(
            "[fw-02] Controller {} stopped in state {} ({} events, {} broadcasts)",
            node_id, stats.state, stats.events_processed, stats.broadcasts
        );
        stats
    }
}
