//! Ports for the controller subsystem.

pub mod inbound;
pub mod outbound;
