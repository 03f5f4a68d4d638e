//! # Coordination Harness
//!
//! ## Startup Sequence
//!
//! 1. Build the topology and its depth map (every node must be reachable)
//! 2. Create the intake queue and the termination signal
//! 3. Bind and start the supervisor (start listener + drain)
//! 4. Bind every controller, then hand each its peer list
//! 5. Send `/start` to the supervisor, inject the flood into the initiator
//! 6. Start one synthetic sender per node
//!
//! ## Shutdown Sequence
//!
//! 1. Raise the termination signal after the observation window
//! 2. Join senders, then controllers, then the supervisor

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use fw_01_topology::{check_depth_invariants, compute_depths, NodeDepth, Topology};
use fw_02_controller::{
    BoundController, ControllerActor, ControllerConfig, ControllerStats, PeerTransport,
    TcpPeerTransport,
};
use fw_03_supervisor::{Supervisor, SupervisorConfig};
use shared_bus::{intake_channel, IntakeSender};
use shared_types::{FloodEvent, NodeId, START_TOKEN};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;
use wave_telemetry::{log_event, log_peer_event};

use crate::container::{
    ControllerSummary, PeerSelection, RunReport, SenderSummary, ShutdownStage, SimulationConfig,
};
use crate::wiring::senders::{run_sender, DelayRange};

/// Raises the termination signal from outside the run.
#[derive(Clone)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Set the termination flag. Idempotent.
    pub fn terminate(&self) {
        self.sender.send_replace(true);
    }
}

/// Runs one flood simulation.
///
/// The termination signal is never reset, so a runtime runs once.
pub struct FloodRuntime {
    run_id: Uuid,
    config: SimulationConfig,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

type Controller = BoundController<TcpPeerTransport, IntakeSender>;

impl FloodRuntime {
    pub fn new(config: SimulationConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            run_id: Uuid::new_v4(),
            config,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            sender: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Execute the run end to end.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate().context("Invalid configuration")?;

        let topology = self
            .config
            .topology
            .build()
            .context("Failed to build topology")?;
        self.config
            .check_node_count(topology.node_count())
            .context("Invalid configuration")?;
        let depths = compute_depths(&topology);
        depths
            .ensure_complete(&topology)
            .context("Topology has nodes unreachable from the root")?;
        check_depth_invariants(&topology, &depths).context("Inconsistent depth map")?;

        info!("===========================================");
        info!("  Flood-Wave run {}", self.run_id);
        info!(
            "  {} nodes, {} edges, max depth {}",
            topology.node_count(),
            topology.edge_count(),
            depths.max_depth()
        );
        info!("===========================================");

        match self.run_with(&topology, depths).await {
            Ok(report) => Ok(report),
            Err(e) => {
                // Let everything already started wind down.
                self.shutdown_handle().terminate();
                Err(e)
            }
        }
    }

    async fn run_with(&self, topology: &Topology, depths: NodeDepth) -> Result<RunReport> {
        let network = &self.config.network;
        let (intake_tx, intake_rx) = intake_channel();

        // Supervisor
        let supervisor_config = SupervisorConfig {
            read_timeout: network.read_timeout,
            ..SupervisorConfig::new(network.supervisor_addr())
                .with_drain_grace(self.config.run.drain_grace)
        };
        let supervisor = Arc::new(Supervisor::new(
            supervisor_config,
            depths,
            self.shutdown_rx.clone(),
        ));
        let start_listener = supervisor
            .bind_start_listener()
            .await
            .context("Failed to start supervisor")?;
        let supervisor_addr = start_listener.local_addr();
        let listener_task = tokio::spawn(start_listener.run());
        let drain_task = {
            let supervisor = Arc::clone(&supervisor);
            tokio::spawn(async move { supervisor.drain(intake_rx).await })
        };

        // Controllers
        let transport = Arc::new(TcpPeerTransport::new(network.send_policy()));
        let controllers = self
            .bind_controllers(topology, &intake_tx, &transport)
            .await?;
        let addresses: BTreeMap<NodeId, SocketAddr> = controllers
            .iter()
            .map(|(id, controller)| (*id, controller.local_addr()))
            .collect();
        for (id, controller) in &controllers {
            controller.set_peers(self.peers_for(*id, topology, &addresses));
        }

        let controller_tasks: Vec<(NodeId, JoinHandle<ControllerStats>)> = controllers
            .into_iter()
            .map(|(id, controller)| (id, tokio::spawn(controller.run())))
            .collect();
        info!("[fw-02] {} controllers running", controller_tasks.len());

        // Kick-off
        if let Err(e) = transport
            .send(supervisor_addr, START_TOKEN.as_bytes())
            .await
        {
            warn!("[fw-03] Could not deliver start signal: {}", e);
        }
        if let Some(initiator) = self.config.run.initiator {
            if let Some(addr) = addresses.get(&initiator) {
                info!("Injecting flood into controller {}", initiator);
                if let Err(e) = transport.send(*addr, &FloodEvent::Flood.encode()).await {
                    log_peer_event!(
                        warn,
                        "runtime",
                        "Could not inject flood into initiator",
                        addr,
                        initiator,
                        error = %e
                    );
                }
            }
        }

        // Synthetic senders
        let delays = DelayRange::new(self.config.run.min_delay, self.config.run.max_delay);
        let sender_tasks: Vec<JoinHandle<SenderSummary>> = topology
            .node_ids()
            .map(|id| {
                tokio::spawn(run_sender(
                    id,
                    topology.neighbors(id).to_vec(),
                    intake_tx.clone(),
                    delays,
                    self.config.run.seed.wrapping_add(u64::from(id)),
                    self.shutdown_rx.clone(),
                ))
            })
            .collect();
        // Only controllers and senders may hold producer handles now.
        drop(intake_tx);

        self.observe().await;
        self.shutdown_handle().terminate();
        log_event!(info, "runtime", "Termination signal raised");

        let mut shutdown_order = Vec::with_capacity(3);

        let mut senders = Vec::with_capacity(sender_tasks.len());
        for task in sender_tasks {
            senders.push(task.await.context("Sender task panicked")?);
        }
        shutdown_order.push(ShutdownStage::Senders);

        let mut controllers = Vec::with_capacity(controller_tasks.len());
        for (id, task) in controller_tasks {
            let stats = task
                .await
                .with_context(|| format!("Controller {} task panicked", id))?;
            controllers.push(ControllerSummary::from(&stats));
        }
        shutdown_order.push(ShutdownStage::Controllers);

        let supervisor_report = drain_task.await.context("Supervisor task panicked")?;
        listener_task
            .await
            .context("Supervisor start listener panicked")?;
        shutdown_order.push(ShutdownStage::Supervisor);

        let report = RunReport {
            run_id: self.run_id,
            supervisor: supervisor_report,
            controllers,
            senders,
            shutdown_order,
        };
        record_metrics(&report);
        Ok(report)
    }

    async fn bind_controllers(
        &self,
        topology: &Topology,
        intake_tx: &IntakeSender,
        transport: &Arc<TcpPeerTransport>,
    ) -> Result<Vec<(NodeId, Controller)>> {
        let network = &self.config.network;
        let mut controllers = Vec::with_capacity(topology.node_count());

        for id in topology.node_ids() {
            let config = ControllerConfig::new(id, network.controller_addr(id)?)
                .with_initiator(self.config.run.initiator == Some(id))
                .with_read_timeout(network.read_timeout);
            let bound = ControllerActor::new(
                config,
                Vec::new(),
                intake_tx.clone(),
                Arc::clone(transport),
                self.shutdown_rx.clone(),
            )
            .bind()
            .await
            .with_context(|| format!("Failed to start controller {}", id))?;
            controllers.push((id, bound));
        }

        Ok(controllers)
    }

    fn peers_for(
        &self,
        id: NodeId,
        topology: &Topology,
        addresses: &BTreeMap<NodeId, SocketAddr>,
    ) -> Vec<SocketAddr> {
        match self.config.network.peer_selection {
            PeerSelection::AllControllers => addresses
                .iter()
                .filter(|(peer, _)| **peer != id)
                .map(|(_, addr)| *addr)
                .collect(),
            PeerSelection::Neighbors => topology
                .neighbors(id)
                .iter()
                .filter(|peer| **peer != id)
                .filter_map(|peer| addresses.get(peer).copied())
                .collect(),
        }
    }

    /// Wait out the observation window, or less if terminated early.
    async fn observe(&self) {
        let mut shutdown = self.shutdown_rx.clone();
        let window = tokio::time::sleep(self.config.run.window);
        tokio::pin!(window);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = &mut window => return,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
        info!("Observation window cut short");
    }
}

fn record_metrics(report: &RunReport) {
    if let Err(e) = wave_telemetry::register_metrics() {
        warn!("Failed to register metrics: {}", e);
    }
    wave_telemetry::RECORDS_DRAINED.inc_by(report.supervisor.total_messages as f64);
    wave_telemetry::MAX_UNIT_TIME.set(f64::from(report.supervisor.max_unit_time));
    wave_telemetry::RUN_ELAPSED_SECONDS.set(report.supervisor.elapsed.as_secs_f64());
    for controller in &report.controllers {
        let node = controller.node_id.to_string();
        wave_telemetry::EVENTS_PROCESSED
            .with_label_values(&[node.as_str()])
            .inc_by(controller.events_processed as f64);
        wave_telemetry::BROADCASTS.inc_by(controller.broadcasts as f64);
        wave_telemetry::PEER_SEND_FAILURES.inc_by(controller.peer_failures as f64);
    }
}
