//! # Wave Telemetry
//!
//! Logging and metrics for a Flood-Wave run.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` registry with an `EnvFilter` and either a
//!   pretty or a JSON fmt layer
//! - **Metrics**: Prometheus counters and gauges in a crate-local registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wave_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FW_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FW_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `FW_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, BROADCASTS, EVENTS_PROCESSED, MAX_UNIT_TIME,
    PEER_SEND_FAILURES, RECORDS_DRAINED, RUN_ELAPSED_SECONDS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics, then install the global subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Log an event tagged with its subsystem.
///
/// ```rust,ignore
/// log_event!(info, "fw-03", "Drain finished", total_messages = 12);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event concerning one peer endpoint.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $msg:expr, $peer:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            peer = %$peer,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
    }

    #[test]
    fn test_macros_expand() {
        let peer = "127.0.0.1:9001";
        log_event!(info, "fw-02", "Controller started", node_id = 1);
        log_event!(debug, "fw-03", "Nothing pending");
        log_peer_event!(warn, "fw-02", "Peer unreachable", peer, attempts = 2);
    }
}
