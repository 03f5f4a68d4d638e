//! # Domain Layer for the Controller
//!
//! Pure logic with no I/O: the flood state machine and the value objects the
//! service reports.
//!
//! ## Design Principles
//!
//! 1. **No I/O**: The state machine decides, the service acts
//! 2. **Terminal Done**: Once `Done`, every input is ignored
//! 3. **Testable**: Every transition is unit tested without sockets

mod state_machine;
mod value_objects;

pub use state_machine::*;
pub use value_objects::*;
