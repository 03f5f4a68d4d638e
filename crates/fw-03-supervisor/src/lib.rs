//! # Supervisor Subsystem (fw-03)
//!
//! Single consumer of the intake queue. Counts every processing record,
//! tracks the largest unit time seen and reports totals once the run ends.
//!
//! ## Architecture Role
//!
//! ```text
//! [Harness] ──"/start"──→ [Start listener] ──start_time──┐
//!                                                         ▼
//! [Controllers, Senders] ──ProcessingRecord──→ [Intake] ──→ [Drain loop] ──→ SupervisorReport
//! ```
//!
//! ## Guarantees
//!
//! - Every record enqueued before termination is counted exactly once.
//! - Counters live on the supervisor instance and change only under its lock.
//! - A receiver without a depth entry is counted but leaves the maximum
//!   unit time untouched.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::*;
pub use errors::SupervisorError;
pub use service::{StartListener, Supervisor};
