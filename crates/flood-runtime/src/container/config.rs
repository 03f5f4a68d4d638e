//! # Simulation Configuration
//!
//! Unified configuration for a run: which topology to flood, where the
//! endpoints live, and how long to observe.
//!
//! All values have defaults; `load_config` applies environment overrides.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use fw_01_topology::{Topology, TopologyError};
use fw_02_controller::SendPolicy;
use shared_types::NodeId;
use thiserror::Error;
use tracing::{info, warn};

/// Complete run configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    /// Graph to flood.
    pub topology: TopologyChoice,
    /// Endpoint and transport settings.
    pub network: NetworkConfig,
    /// Timing and seeding.
    pub run: RunConfig,
}

/// Which graph a run uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopologyChoice {
    /// The six-node reference tree.
    #[default]
    Tree,
    /// Directed ring of `n` nodes.
    Ring(usize),
    /// Every node linked to every other.
    FullyConnected(usize),
    /// Adjacency mapping read from a JSON file.
    File(PathBuf),
}

impl TopologyChoice {
    /// Build the topology.
    pub fn build(&self) -> Result<Topology, ConfigError> {
        match self {
            TopologyChoice::Tree => Ok(Topology::tree()),
            TopologyChoice::Ring(n) => Ok(Topology::ring(*n)?),
            TopologyChoice::FullyConnected(n) => Ok(Topology::fully_connected(*n)?),
            TopologyChoice::File(path) => {
                let document =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::TopologyFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Topology::from_json(&document)?)
            }
        }
    }

    /// Node count known without building, if any.
    pub fn preset_size(&self) -> Option<usize> {
        match self {
            TopologyChoice::Tree => Some(6),
            TopologyChoice::Ring(n) | TopologyChoice::FullyConnected(n) => Some(*n),
            TopologyChoice::File(_) => None,
        }
    }

    fn parse(kind: &str, nodes: Option<usize>, file: Option<PathBuf>) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "tree" | "1" => Some(TopologyChoice::Tree),
            "ring" | "2" => Some(TopologyChoice::Ring(nodes.unwrap_or(4))),
            "full" | "fully-connected" | "fully_connected" | "3" => {
                Some(TopologyChoice::FullyConnected(nodes.unwrap_or(4)))
            }
            "file" => file.map(TopologyChoice::File),
            _ => None,
        }
    }
}

/// Which endpoints a controller forwards the flood to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeerSelection {
    /// Every other controller, regardless of topology.
    #[default]
    AllControllers,
    /// Only the controller's topology neighbors.
    Neighbors,
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Host every endpoint binds to.
    pub host: IpAddr,
    /// Controller `i` listens on `base_port + i`. Zero means ephemeral.
    pub base_port: u16,
    /// Supervisor `/start` port. Zero means ephemeral.
    pub supervisor_port: u16,
    /// Fan-out target set.
    pub peer_selection: PeerSelection,
    /// Per-attempt connect timeout.
    pub connect_timeout: Duration,
    /// Inbound read timeout.
    pub read_timeout: Duration,
    /// Connect attempts per peer.
    pub send_attempts: u32,
    /// Pause between connect attempts.
    pub retry_backoff: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            base_port: 9000,
            supervisor_port: 8888,
            peer_selection: PeerSelection::AllControllers,
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_secs(2),
            send_attempts: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl NetworkConfig {
    /// Configured address of controller `node_id`.
    pub fn controller_addr(&self, node_id: NodeId) -> Result<SocketAddr, ConfigError> {
        if self.base_port == 0 {
            return Ok(SocketAddr::new(self.host, 0));
        }
        let port = u32::from(self.base_port) + node_id;
        let port = u16::try_from(port).map_err(|_| ConfigError::PortOverflow {
            base_port: self.base_port,
            nodes: node_id as usize + 1,
        })?;
        Ok(SocketAddr::new(self.host, port))
    }

    pub fn supervisor_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.supervisor_port)
    }

    pub fn send_policy(&self) -> SendPolicy {
        SendPolicy {
            connect_timeout: self.connect_timeout,
            max_attempts: self.send_attempts,
            retry_backoff: self.retry_backoff,
        }
    }
}

/// Run timing configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// How long the harness lets the run proceed before termination.
    pub window: Duration,
    /// Lower bound of a sender's pause.
    pub min_delay: Duration,
    /// Upper bound of a sender's pause.
    pub max_delay: Duration,
    /// RNG seed; sender `i` uses `seed + i`.
    pub seed: u64,
    /// Node that starts the flood, if any.
    pub initiator: Option<NodeId>,
    /// Upper bound on the supervisor's post-termination drain.
    pub drain_grace: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            seed: 1,
            initiator: Some(0),
            drain_grace: Duration::from_secs(2),
        }
    }
}

impl SimulationConfig {
    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.min_delay > self.run.max_delay {
            return Err(ConfigError::InvertedDelayRange {
                min: self.run.min_delay,
                max: self.run.max_delay,
            });
        }
        if let Some(nodes) = self.topology.preset_size() {
            self.check_node_count(nodes)?;
        }
        Ok(())
    }

    /// Checks that depend on the built topology's size.
    pub fn check_node_count(&self, nodes: usize) -> Result<(), ConfigError> {
        if nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if self.network.base_port != 0
            && usize::from(self.network.base_port) + nodes > usize::from(u16::MAX)
        {
            return Err(ConfigError::PortOverflow {
                base_port: self.network.base_port,
                nodes,
            });
        }
        if let Some(initiator) = self.run.initiator {
            if initiator as usize >= nodes {
                return Err(ConfigError::UnknownInitiator { initiator, nodes });
            }
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Topology has no nodes")]
    NoNodes,

    #[error("Base port {base_port} cannot host {nodes} controllers")]
    PortOverflow { base_port: u16, nodes: usize },

    #[error("Sender delay range is inverted: {min:?} > {max:?}")]
    InvertedDelayRange { min: Duration, max: Duration },

    #[error("Initiator {initiator} is not one of the {nodes} nodes")]
    UnknownInitiator { initiator: NodeId, nodes: usize },

    #[error("Failed to read topology file {path:?}: {reason}")]
    TopologyFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

/// Load configuration from the environment.
pub fn load_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();

    let nodes = env_parse::<usize>("FW_NODES");
    let file = std::env::var("FW_TOPOLOGY_FILE").ok().map(PathBuf::from);
    if let Ok(kind) = std::env::var("FW_TOPOLOGY") {
        match TopologyChoice::parse(&kind, nodes, file.clone()) {
            Some(choice) => config.topology = choice,
            None => warn!("Ignoring invalid FW_TOPOLOGY={:?}", kind),
        }
    } else if let Some(path) = file {
        config.topology = TopologyChoice::File(path);
    }

    if let Some(host) = env_parse("FW_HOST") {
        config.network.host = host;
    }
    if let Some(port) = env_parse("FW_BASE_PORT") {
        config.network.base_port = port;
    }
    if let Some(port) = env_parse("FW_SUPERVISOR_PORT") {
        config.network.supervisor_port = port;
    }
    if let Ok(peers) = std::env::var("FW_PEERS") {
        match peers.trim().to_lowercase().as_str() {
            "all" => config.network.peer_selection = PeerSelection::AllControllers,
            "neighbors" => config.network.peer_selection = PeerSelection::Neighbors,
            _ => warn!("Ignoring invalid FW_PEERS={:?}", peers),
        }
    }

    if let Some(secs) = env_parse::<f64>("FW_WINDOW_SECS") {
        match Duration::try_from_secs_f64(secs) {
            Ok(window) => config.run.window = window,
            Err(_) => warn!("Ignoring invalid FW_WINDOW_SECS={}", secs),
        }
    }
    if let Some(seed) = env_parse("FW_SEED") {
        config.run.seed = seed;
    }
    if let Ok(raw) = std::env::var("FW_INITIATOR") {
        match raw.trim().to_lowercase().as_str() {
            "none" | "" => config.run.initiator = None,
            other => match other.parse() {
                Ok(id) => config.run.initiator = Some(id),
                Err(_) => warn!("Ignoring invalid FW_INITIATOR={:?}", raw),
            },
        }
    }

    info!(
        topology = ?config.topology,
        base_port = config.network.base_port,
        supervisor_port = config.network.supervisor_port,
        "Configuration loaded"
    );

    config
}
