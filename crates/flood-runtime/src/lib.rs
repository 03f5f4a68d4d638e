//! # Flood Runtime Library
//!
//! Exposes the run configuration and the harness for the binary and for the
//! integration tests. The entry point is the `main.rs` binary.
//!
//! - `container/` - configuration and the run report
//! - `wiring/` - the harness and the synthetic senders

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod container;
pub mod wiring;

pub use container::{load_config, RunReport, SimulationConfig};
pub use wiring::{FloodRuntime, ShutdownHandle};
