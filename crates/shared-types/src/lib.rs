//! # Shared Types Crate
//!
//! This crate contains the entities and wire tokens shared by every flood
//! subsystem: node identifiers, controller states, the flood event token and
//! the processing record consumed by the supervisor.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Tokens**: The flood event carries no payload on the wire; the
//!   marker itself is the message.
//! - **Producer Identity**: A `ProcessingRecord` names its sender and receiver
//!   explicitly; the supervisor never infers identity from the transport.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod errors;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use wire::{FloodEvent, FLOOD_MARKER, MAX_MESSAGE_BYTES, START_TOKEN};
