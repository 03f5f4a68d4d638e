//! # Domain Layer for Topology
//!
//! Pure graph logic with no I/O.
//!
//! ## Contents
//!
//! - **entities**: [`Topology`] and its presets
//! - **depth**: [`NodeDepth`] and the DFS [`compute_depths`]
//! - **invariants**: Checks over a computed depth map

mod depth;
mod entities;
mod invariants;

pub use depth::*;
pub use entities::*;
pub use invariants::*;
