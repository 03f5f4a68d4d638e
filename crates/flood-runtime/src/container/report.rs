//! The result of a run.

use std::fmt;

use fw_02_controller::ControllerStats;
use fw_03_supervisor::SupervisorReport;
use serde::Serialize;
use shared_types::{ControllerState, NodeId};
use uuid::Uuid;

/// Groups joined by the harness, in the order they stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ShutdownStage {
    Senders,
    Controllers,
    Supervisor,
}

/// Final state of one controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControllerSummary {
    pub node_id: NodeId,
    pub state: ControllerState,
    pub events_processed: u64,
    pub broadcasts: u64,
    pub peer_deliveries: u64,
    pub peer_failures: u64,
    pub records_reported: u64,
}

impl From<&ControllerStats> for ControllerSummary {
    fn from(stats: &ControllerStats) -> Self {
        Self {
            node_id: stats.node_id,
            state: stats.state,
            events_processed: stats.events_processed,
            broadcasts: stats.broadcasts,
            peer_deliveries: stats.peer_deliveries,
            peer_failures: stats.peer_failures,
            records_reported: stats.records_reported,
        }
    }
}

/// What one synthetic sender managed to enqueue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SenderSummary {
    pub node_id: NodeId,
    pub sent: u64,
    /// False when termination cut the sender short.
    pub completed: bool,
}

/// Everything a run produced.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub supervisor: SupervisorReport,
    pub controllers: Vec<ControllerSummary>,
    pub senders: Vec<SenderSummary>,
    pub shutdown_order: Vec<ShutdownStage>,
}

impl RunReport {
    pub fn total_broadcasts(&self) -> u64 {
        self.controllers.iter().map(|c| c.broadcasts).sum()
    }

    pub fn total_peer_deliveries(&self) -> u64 {
        self.controllers.iter().map(|c| c.peer_deliveries).sum()
    }

    pub fn records_sent(&self) -> u64 {
        self.senders.iter().map(|s| s.sent).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;
        writeln!(f, "Total messages processed: {}", self.supervisor.total_messages)?;
        writeln!(f, "Maximum unit time:        {}", self.supervisor.max_unit_time)?;
        writeln!(
            f,
            "Elapsed:                  {:.3}s",
            self.supervisor.elapsed.as_secs_f64()
        )?;
        writeln!(
            f,
            "Broadcasts: {}, peer deliveries: {}, synthetic records: {}",
            self.total_broadcasts(),
            self.total_peer_deliveries(),
            self.records_sent()
        )?;
        for controller in &self.controllers {
            writeln!(
                f,
                "  controller {:>3}: {:<9} events={} broadcasts={} delivered={} failed={}",
                controller.node_id,
                controller.state,
                controller.events_processed,
                controller.broadcasts,
                controller.peer_deliveries,
                controller.peer_failures
            )?;
        }
        Ok(())
    }
}
