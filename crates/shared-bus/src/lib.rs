//! # Shared Bus - Supervisor Intake Queue
//!
//! Every producer in a run (controllers and synthetic senders) pushes
//! [`ProcessingRecord`]s into one queue; the supervisor is its only consumer.
//!
//! ```text
//! ┌──────────────┐
//! │ Controller 0 │──publish()──┐
//! └──────────────┘             │
//! ┌──────────────┐             ▼
//! │ Controller 1 │───────→ ┌──────────────┐  recv()   ┌────────────┐
//! └──────────────┘         │ Intake Queue │ ────────→ │ Supervisor │
//! ┌──────────────┐         └──────────────┘           └────────────┘
//! │  Sender  k   │─────────────↑
//! └──────────────┘
//! ```
//!
//! ## Delivery
//!
//! - Each record is delivered to exactly one consumer (mpsc, not broadcast).
//! - FIFO per producer; no causal order across producers.
//! - The queue closes once every [`IntakeSender`] clone is dropped, which is
//!   how the supervisor knows no producer can still enqueue.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::mpsc;

pub use publisher::{IntakeSender, RecordPublisher};
pub use subscriber::{IntakeError, IntakeReceiver};

pub use shared_types::ProcessingRecord;

/// Maximum records buffered before producers wait for the supervisor.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Create an intake queue with the default capacity.
#[must_use]
pub fn intake_channel() -> (IntakeSender, IntakeReceiver) {
    intake_channel_with_capacity(DEFAULT_CHANNEL_CAPACITY)
}

/// Create an intake queue with a specific capacity.
#[must_use]
pub fn intake_channel_with_capacity(capacity: usize) -> (IntakeSender, IntakeReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let published = Arc::new(AtomicU64::new(0));
    (
        IntakeSender::new(sender, Arc::clone(&published)),
        IntakeReceiver::new(receiver, published),
    )
}
