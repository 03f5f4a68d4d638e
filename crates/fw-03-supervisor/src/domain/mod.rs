//! Supervisor domain: run counters, the start clock and the connection
//! registry. No I/O.

mod counters;
mod registry;

pub use counters::*;
pub use registry::*;
