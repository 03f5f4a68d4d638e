//! # Flood State Machine
//!
//! ```text
//!  ┌───────────┐  FLOOD   ┌──────┐
//!  │   Idle    │ ───────→ │      │
//!  └───────────┘          │ Done │ ──any──→ (ignored)
//!  ┌───────────┐  FLOOD   │      │
//!  │ Initiator │ ───────→ │      │
//!  └───────────┘          └──────┘
//! ```
//!
//! A node forwards the flood at most once: on its own initiation or on its
//! first reception of the marker. Back-edges in the topology therefore never
//! cause a second broadcast.

use shared_types::{ControllerState, FloodEvent, NodeId};

/// Outcome of feeding one event into the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The initiator received its trigger and starts the wave.
    Initiated,
    /// An idle node received the flood for the first time.
    FirstReception,
    /// No state change.
    Ignored,
}

impl Transition {
    /// True when the controller must broadcast the flood to its peers.
    pub fn should_broadcast(&self) -> bool {
        matches!(self, Transition::Initiated | Transition::FirstReception)
    }
}

/// Per-controller flood state.
#[derive(Clone, Debug)]
pub struct FloodStateMachine {
    node_id: NodeId,
    state: ControllerState,
}

impl FloodStateMachine {
    /// A machine in `Idle`.
    pub fn new(node_id: NodeId) -> Self {
        Self::with_state(node_id, ControllerState::Idle)
    }

    /// A machine designated to start the wave.
    pub fn initiator(node_id: NodeId) -> Self {
        Self::with_state(node_id, ControllerState::Initiator)
    }

    pub fn with_state(node_id: NodeId, state: ControllerState) -> Self {
        Self { node_id, state }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Apply one event.
    pub fn process(&mut self, event: &FloodEvent) -> Transition {
        match (self.state, event) {
            (ControllerState::Initiator, FloodEvent::Flood) => {
                self.state = ControllerState::Done;
                Transition::Initiated
            }
            (ControllerState::Idle, FloodEvent::Flood) => {
                self.state = ControllerState::Done;
                Transition::FirstReception
            }
            _ => Transition::Ignored,
        }
    }
}
