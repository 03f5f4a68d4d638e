//! # Integration Flows
//!
//! Topology (1) → Controllers (2) → Supervisor (3), over real loopback TCP.

pub mod failures;
pub mod flooding;
pub mod runs;

use std::time::Duration;

use flood_runtime::container::{SimulationConfig, TopologyChoice};

/// A config that binds ephemeral ports and finishes quickly.
pub fn fast_config(topology: TopologyChoice) -> SimulationConfig {
    let mut config = SimulationConfig {
        topology,
        ..Default::default()
    };
    config.network.base_port = 0;
    config.network.supervisor_port = 0;
    config.run.window = Duration::from_millis(1500);
    config.run.min_delay = Duration::from_millis(5);
    config.run.max_delay = Duration::from_millis(20);
    config.run.drain_grace = Duration::from_secs(2);
    config
}
