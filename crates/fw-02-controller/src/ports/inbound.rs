//! Inbound ports (API) for the controller subsystem.

use async_trait::async_trait;
use shared_types::{ControllerState, FloodEvent, NodeId};

use crate::domain::{ControllerStats, EventOutcome};

/// Primary API of a controller.
///
/// The TCP endpoint drives this for every inbound connection; tests drive it
/// directly.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Logical id of this controller.
    fn node_id(&self) -> NodeId;

    /// Current protocol state.
    fn state(&self) -> ControllerState;

    /// Apply one decoded event.
    ///
    /// Runs the state machine and fans out to every peer when the
    /// transition calls for it. Reporting to the supervisor is left to the
    /// connection path.
    async fn process_event(&self, event: FloodEvent) -> EventOutcome;

    /// Snapshot of the controller's counters.
    fn stats(&self) -> ControllerStats;
}
