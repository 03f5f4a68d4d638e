//! # Run Container
//!
//! Configuration for one run and the report it produces.

pub mod config;
pub mod report;

pub use config::{
    load_config, ConfigError, NetworkConfig, PeerSelection, RunConfig, SimulationConfig,
    TopologyChoice,
};
pub use report::{ControllerSummary, RunReport, SenderSummary, ShutdownStage};
