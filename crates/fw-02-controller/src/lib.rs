//! # Controller Subsystem (fw-02)
//!
//! One controller per logical node. A controller listens on its own TCP
//! endpoint, runs the flood state machine over every inbound token, forwards
//! the flood to its peers at most once, and reports each processed event to
//! the supervisor intake.
//!
//! ## Architecture Role
//!
//! ```text
//!                 "I"                         "I" (fan-out, once)
//! [Peer / Harness] ──→ [Controller i] ──────────────────────────→ [Peers]
//!                            │
//!                            └──ProcessingRecord──→ [Intake] ──→ [Supervisor (3)]
//! ```
//!
//! ## Protocol
//!
//! - `Idle` + flood marker → `Done`, broadcast
//! - `Initiator` + flood marker → `Done`, broadcast
//! - anything else → ignored
//!
//! Transport errors are logged and never stop the actor; only the shared
//! termination signal does.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
pub mod transport;

pub use domain::*;
pub use errors::{ControllerError, TransportError};
pub use ports::inbound::ControllerApi;
pub use ports::outbound::PeerTransport;
pub use service::{BoundController, ControllerActor};
pub use transport::TcpPeerTransport;
