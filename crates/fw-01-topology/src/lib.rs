//! # Topology Subsystem (fw-01)
//!
//! Holds the static graph a run floods over and derives each node's depth,
//! the logical "unit time" the supervisor reports.
//!
//! ## Architecture Role
//!
//! ```text
//! [Runtime config] ──TopologyChoice──→ [Topology (1)] ──NodeDepth──→ [Supervisor (3)]
//!                                            │
//!                                            └──neighbors──→ [Synthetic senders]
//! ```
//!
//! A topology is immutable for the lifetime of a run.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod errors;

pub use domain::*;
pub use errors::TopologyError;
