//! # Run Wiring
//!
//! Connects the subsystems for one run.
//!
//! ```text
//!          ┌───────────────┐   "/start"   ┌────────────────┐
//!          │    Harness    │ ───────────→ │ Supervisor (3) │
//!          └───────┬───────┘              └───────▲────────┘
//!        "I" (once)│                              │ ProcessingRecord
//!                  ▼                              │
//!   ┌────────────────────────────┐                │
//!   │ Controllers (2) ⇄ peers    │ ───────────────┤
//!   └────────────────────────────┘                │
//!   ┌────────────────────────────┐                │
//!   │ Synthetic senders          │ ───────────────┘
//!   └────────────────────────────┘
//! ```
//!
//! Shutdown joins senders, then controllers, then the supervisor.

pub mod harness;
pub mod senders;

pub use harness::{FloodRuntime, ShutdownHandle};
pub use senders::{run_sender, DelayRange};
