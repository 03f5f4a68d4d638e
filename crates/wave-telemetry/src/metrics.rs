//! Prometheus metrics for a run.
//!
//! Naming: `fw_<subsystem>_<metric>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Registry for every Flood-Wave metric
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SUPERVISOR METRICS (Subsystem 3)
    // =========================================================================

    /// Records drained from the intake queue
    pub static ref RECORDS_DRAINED: Counter = Counter::new(
        "fw_supervisor_records_drained_total",
        "Total processing records counted by the supervisor"
    ).expect("metric creation failed");

    /// Largest unit time seen in the last run
    pub static ref MAX_UNIT_TIME: Gauge = Gauge::new(
        "fw_supervisor_max_unit_time",
        "Largest receiver depth among counted records"
    ).expect("metric creation failed");

    // =========================================================================
    // CONTROLLER METRICS (Subsystem 2)
    // =========================================================================

    /// Inbound events per controller
    pub static ref EVENTS_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("fw_controller_events_processed_total", "Inbound events handled"),
        &["node"]
    ).expect("metric creation failed");

    /// Flood fan-outs
    pub static ref BROADCASTS: Counter = Counter::new(
        "fw_controller_broadcasts_total",
        "Total flood broadcasts across all controllers"
    ).expect("metric creation failed");

    /// Peers a flood token could not be delivered to
    pub static ref PEER_SEND_FAILURES: Counter = Counter::new(
        "fw_controller_peer_send_failures_total",
        "Total failed peer sends"
    ).expect("metric creation failed");

    // =========================================================================
    // RUN METRICS
    // =========================================================================

    /// Wall clock of the last run
    pub static ref RUN_ELAPSED_SECONDS: Gauge = Gauge::new(
        "fw_run_elapsed_seconds",
        "Seconds between the start signal and the final report"
    ).expect("metric creation failed");
}

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Supervisor
        Box::new(RECORDS_DRAINED.clone()),
        Box::new(MAX_UNIT_TIME.clone()),
        // Controllers
        Box::new(EVENTS_PROCESSED.clone()),
        Box::new(BROADCASTS.clone()),
        Box::new(PEER_SEND_FAILURES.clone()),
        // Run
        Box::new(RUN_ELAPSED_SECONDS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_counter_increment() {
        BROADCASTS.inc();
        assert!(BROADCASTS.get() >= 1.0);
    }

    #[test]
    fn test_encode_contains_names() {
        register_metrics().unwrap();
        RECORDS_DRAINED.inc();
        EVENTS_PROCESSED.with_label_values(&["0"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("fw_supervisor_records_drained_total"));
        assert!(text.contains("fw_controller_events_processed_total"));
    }
}
