//! # Flood-Wave Runtime
//!
//! Runs one flood simulation and prints the supervisor's totals.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration (defaults + `FW_*` environment overrides)
//! 3. Run the harness; Ctrl+C raises termination early
//! 4. Print the report (`FW_REPORT_JSON=1` for JSON)
//! 5. Print Prometheus metrics when `FW_METRICS=1`

use anyhow::{Context, Result};
use tracing::{info, warn};

use flood_runtime::{load_config, FloodRuntime};
use wave_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = load_config();
    config.validate().context("Invalid configuration")?;

    let runtime = FloodRuntime::new(config);
    let handle = runtime.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, terminating early");
                handle.terminate();
            }
            Err(e) => warn!("Could not listen for Ctrl+C: {}", e),
        }
    });

    let report = runtime.run().await?;

    if env_flag("FW_REPORT_JSON") {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else {
        print!("{}", report);
    }

    if env_flag("FW_METRICS") {
        print!(
            "{}",
            wave_telemetry::encode_metrics().context("Failed to encode metrics")?
        );
    }

    Ok(())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
