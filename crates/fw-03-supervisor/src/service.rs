//! # Supervisor Service
//!
//! Two concurrent loops share one [`Supervisor`]:
//!
//! - [`StartListener::run`] accepts `/start` connections and moves the wall
//!   clock.
//! - [`Supervisor::drain`] consumes the intake queue until termination, then
//!   empties it and returns the [`SupervisorReport`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use fw_01_topology::NodeDepth;
use parking_lot::Mutex;
use shared_bus::{IntakeError, IntakeReceiver};
use shared_types::wire::is_start_token;
use shared_types::{ProcessingRecord, MAX_MESSAGE_BYTES};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::{
    ConnectionId, ConnectionRegistry, RecordSummary, StartClock, SupervisorConfig,
    SupervisorCounters, SupervisorReport,
};
use crate::errors::SupervisorError;

/// Aggregates processing records for one run.
pub struct Supervisor {
    config: SupervisorConfig,
    depths: NodeDepth,
    counters: Mutex<SupervisorCounters>,
    clock: Mutex<StartClock>,
    registry: ConnectionRegistry,
    shutdown: watch::Receiver<bool>,
}

impl Supervisor {
    pub fn new(
        config: SupervisorConfig,
        depths: NodeDepth,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            depths,
            counters: Mutex::new(SupervisorCounters::default()),
            clock: Mutex::new(StartClock::new()),
            registry: ConnectionRegistry::new(),
            shutdown,
        }
    }

    pub fn counters(&self) -> SupervisorCounters {
        *self.counters.lock()
    }

    /// Open the `/start` endpoint.
    pub async fn bind_start_listener(
        self: &Arc<Self>,
    ) -> Result<StartListener, SupervisorError> {
        let addr = self.config.address;
        let bind_failed = |e: std::io::Error| SupervisorError::BindFailed {
            addr,
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_failed)?;
        let local_addr = listener.local_addr().map_err(bind_failed)?;

        info!("[fw-03] Supervisor listening on {}", local_addr);

        Ok(StartListener {
            listener,
            local_addr,
            supervisor: Arc::clone(self),
        })
    }

    /// Move the wall clock to now. Only the first call has effect.
    pub fn mark_started(&self) -> bool {
        let first = self.clock.lock().mark_started(Instant::now());
        if first {
            info!("[fw-03] Start signal received");
        } else {
            debug!("Repeated start signal ignored");
        }
        first
    }

    /// Count one record and log its summary line.
    pub fn record(&self, record: &ProcessingRecord) -> RecordSummary {
        let unit_time = self.depths.get(record.receiver_id);
        let message_count = self.counters.lock().apply(unit_time);
        let real_time = self.clock.lock().elapsed();

        match unit_time {
            Some(unit_time) => info!(
                sender_id = record.sender_id,
                receiver_id = record.receiver_id,
                message = %record.message,
                message_count,
                unit_time,
                real_time_secs = real_time.as_secs_f64(),
                "Processed {}",
                record
            ),
            None => warn!(
                sender_id = record.sender_id,
                receiver_id = record.receiver_id,
                message_count,
                real_time_secs = real_time.as_secs_f64(),
                "Receiver {} has no depth entry, unit time unknown",
                record.receiver_id
            ),
        }

        RecordSummary {
            message_count,
            unit_time,
            real_time,
        }
    }

    /// Totals as of now.
    pub fn report(&self) -> SupervisorReport {
        let counters = self.counters();
        let clock = *self.clock.lock();
        SupervisorReport {
            total_messages: counters.message_count,
            max_unit_time: counters.max_unit_time,
            unknown_receivers: counters.unknown_receivers,
            start_signal_received: clock.start_signal_received(),
            elapsed: clock.elapsed(),
        }
    }

    /// Consume the intake queue until termination, then empty it.
    ///
    /// After termination the loop keeps reading until every producer handle
    /// is dropped, bounded by the drain grace timeout.
    pub async fn drain(&self, mut intake: IntakeReceiver) -> SupervisorReport {
        let mut shutdown = self.shutdown.clone();
        let mut intake_open = true;

        while intake_open && !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                record = intake.recv() => match record {
                    Some(record) => {
                        self.record(&record);
                    }
                    None => {
                        debug!("Intake closed before termination");
                        intake_open = false;
                    }
                },
            }
        }

        if intake_open {
            self.drain_remaining(&mut intake).await;
        }

        let report = self.report();
        info!(
            total_messages = report.total_messages,
            max_unit_time = report.max_unit_time,
            "[fw-03] Supervisor finished: {} messages, max unit time {}",
            report.total_messages,
            report.max_unit_time
        );
        report
    }

    async fn drain_remaining(&self, intake: &mut IntakeReceiver) {
        let grace = self.config.drain_grace;
        let drained = timeout(grace, async {
            while let Some(record) = intake.recv().await {
                self.record(&record);
            }
        })
        .await;

        if drained.is_ok() {
            debug!("Intake drained and closed");
            return;
        }

        warn!(
            pending = intake.pending(),
            "Drain grace of {:?} elapsed with producers still attached", grace
        );
        // Whatever is already buffered still counts.
        loop {
            match intake.try_recv() {
                Ok(Some(record)) => {
                    self.record(&record);
                }
                Ok(None) | Err(IntakeError::Closed) => break,
            }
        }
    }

    async fn handle_start_connection(&self, id: ConnectionId, mut stream: TcpStream) {
        let mut shutdown = self.shutdown.clone();
        let read = tokio::select! {
            read = timeout(self.config.read_timeout, read_start_token(&mut stream)) => Some(read),
            _ = terminated(&mut shutdown) => None,
        };

        let remote = self.registry.get(id);
        match read {
            Some(Ok(Ok(true))) => {
                self.mark_started();
            }
            Some(Ok(Ok(false))) => debug!(?remote, "Start connection closed without token"),
            Some(Ok(Err(e))) => warn!("[fw-03] Read from {:?} failed: {}", remote, e),
            Some(Err(_)) => debug!(?remote, "Start connection timed out"),
            None => debug!(?remote, "Start connection dropped on termination"),
        }

        if self.registry.remove(id).is_none() {
            debug!(id, "Peer already gone");
        }
    }
}

/// Resolves once termination is raised or its sender is dropped.
async fn terminated(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Read until the start token shows up, EOF, or the size cap.
async fn read_start_token(stream: &mut TcpStream) -> std::io::Result<bool> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(false);
        }
        buf.extend_from_slice(&chunk[..n]);
        if is_start_token(&buf) {
            return Ok(true);
        }
        if buf.len() >= MAX_MESSAGE_BYTES {
            return Ok(false);
        }
    }
}

/// The supervisor's bound `/start` endpoint.
pub struct StartListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    supervisor: Arc<Supervisor>,
}

impl StartListener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept start connections until termination.
    pub async fn run(self) {
        let Self {
            listener,
            supervisor,
            ..
        } = self;
        let mut shutdown = supervisor.shutdown.clone();
        let mut handlers = JoinSet::new();

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let id = supervisor.registry.register(remote);
                        let handler = Arc::clone(&supervisor);
                        handlers.spawn(async move {
                            handler.handle_start_connection(id, stream).await;
                        });
                    }
                    Err(e) => warn!("[fw-03] Start listener accept failed: {}", e),
                },
                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    if let Err(e) = joined {
                        warn!("[fw-03] Start handler failed: {}", e);
                    }
                }
            }
        }

        // Handlers also watch termination.
        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                warn!("[fw-03] Start handler failed: {}", e);
            }
        }

        debug!(
            open_connections = supervisor.registry.len(),
            "Start listener stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_01_topology::{compute_depths, Topology};
    use shared_bus::{intake_channel, RecordPublisher};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn tree_supervisor() -> (Arc<Supervisor>, watch::Sender<bool>) {
        let depths = compute_depths(&Topology::tree());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = SupervisorConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)))
            .with_drain_grace(Duration::from_millis(500));
        (
            Arc::new(Supervisor::new(config, depths, shutdown_rx)),
            shutdown_tx,
        )
    }

    #[test]
    fn test_root_sender_records_have_unit_time_one() {
        let (supervisor, _shutdown) = tree_supervisor();
        for receiver in [1, 2, 3] {
            let summary = supervisor.record(&ProcessingRecord::synthetic(0, receiver));
            assert_eq!(summary.unit_time, Some(1));
        }

        let report = supervisor.report();
        assert_eq!(report.total_messages, 3);
        assert_eq!(report.max_unit_time, 1);
    }

    #[test]
    fn test_unknown_receiver_counted_once() {
        let (supervisor, _shutdown) = tree_supervisor();
        supervisor.record(&ProcessingRecord::synthetic(1, 4));
        let summary = supervisor.record(&ProcessingRecord::synthetic(0, 42));

        assert_eq!(summary.unit_time, None);
        assert_eq!(summary.message_count, 2);
        assert_eq!(supervisor.report().max_unit_time, 2);
        assert_eq!(supervisor.report().unknown_receivers, 1);
    }

    #[tokio::test]
    async fn test_drain_counts_every_record_before_termination() {
        let (supervisor, shutdown) = tree_supervisor();
        let (tx, rx) = intake_channel();

        for receiver in [1, 2, 3, 4, 5] {
            tx.publish(ProcessingRecord::synthetic(0, receiver))
                .await
                .unwrap();
        }
        shutdown.send(true).unwrap();
        drop(tx);

        let report = supervisor.drain(rx).await;
        assert_eq!(report.total_messages, 5);
        assert_eq!(report.max_unit_time, 2);
    }

    #[tokio::test]
    async fn test_drain_waits_for_late_producers_after_termination() {
        let (supervisor, shutdown) = tree_supervisor();
        let (tx, rx) = intake_channel();

        let drain = {
            let supervisor = Arc::clone(&supervisor);
            tokio::spawn(async move { supervisor.drain(rx).await })
        };

        tx.publish(ProcessingRecord::synthetic(0, 1)).await.unwrap();
        shutdown.send(true).unwrap();
        tx.publish(ProcessingRecord::synthetic(1, 4)).await.unwrap();
        drop(tx);

        let report = timeout(Duration::from_secs(5), drain)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.total_messages, 2);
    }

    #[tokio::test]
    async fn test_drain_grace_bounds_shutdown() {
        let (supervisor, shutdown) = tree_supervisor();
        let (tx, rx) = intake_channel();
        tx.publish(ProcessingRecord::synthetic(0, 2)).await.unwrap();
        shutdown.send(true).unwrap();

        // `tx` stays alive; drain must still return.
        let report = timeout(Duration::from_secs(5), supervisor.drain(rx))
            .await
            .unwrap();
        assert_eq!(report.total_messages, 1);
        drop(tx);
    }

    #[tokio::test]
    async fn test_start_token_marks_clock() {
        let (supervisor, shutdown) = tree_supervisor();
        let listener = supervisor.bind_start_listener().await.unwrap();
        let addr = listener.local_addr();
        let task = tokio::spawn(listener.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"/start").await.unwrap();
        stream.shutdown().await.unwrap();

        timeout(Duration::from_secs(5), async {
            while !supervisor.report().start_signal_received {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        shutdown.send(true).unwrap();
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_other_input_does_not_start_clock() {
        let (supervisor, shutdown) = tree_supervisor();
        let listener = supervisor.bind_start_listener().await.unwrap();
        let addr = listener.local_addr();
        let task = tokio::spawn(listener.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"hello").await.unwrap();
        stream.shutdown().await.unwrap();
        drop(stream);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!supervisor.report().start_signal_received);

        shutdown.send(true).unwrap();
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_listener_stops_with_idle_connection_open() {
        let depths = compute_depths(&Topology::tree());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut config = SupervisorConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.read_timeout = Duration::from_secs(30);
        let supervisor = Arc::new(Supervisor::new(config, depths, shutdown_rx));

        let listener = supervisor.bind_start_listener().await.unwrap();
        let addr = listener.local_addr();
        let task = tokio::spawn(listener.run());

        let _idle = TcpStream::connect(addr).await.unwrap();
        timeout(Duration::from_secs(5), async {
            while supervisor.registry.len() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
        assert_eq!(supervisor.registry.len(), 0);
        assert!(!supervisor.report().start_signal_received);
    }
}
