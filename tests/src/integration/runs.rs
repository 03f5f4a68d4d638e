//! # Full Runs
//!
//! The harness end to end: supervisor, controllers and senders on ephemeral
//! ports, one observation window, ordered shutdown.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use flood_runtime::container::{PeerSelection, ShutdownStage, TopologyChoice};
    use flood_runtime::{FloodRuntime, RunReport};
    use shared_types::ControllerState;
    use tokio::time::timeout;

    use crate::integration::fast_config;

    async fn run(config: flood_runtime::SimulationConfig) -> RunReport {
        let runtime = FloodRuntime::new(config);
        timeout(Duration::from_secs(30), runtime.run())
            .await
            .expect("run timed out")
            .expect("run failed")
    }

    /// Every record enqueued before shutdown is counted once.
    fn assert_exactly_once(report: &RunReport) {
        let reported: u64 = report.controllers.iter().map(|c| c.records_reported).sum();
        assert_eq!(
            report.supervisor.total_messages,
            report.records_sent() + reported
        );
    }

    // =========================================================================
    // TREE
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tree_run_end_to_end() {
        let report = run(fast_config(TopologyChoice::Tree)).await;

        // Senders: 0 → 1,2,3 and 1 → 4,5.
        assert_eq!(report.records_sent(), 5);
        assert!(report.senders.iter().all(|s| s.completed));

        assert_eq!(report.controllers.len(), 6);
        for controller in &report.controllers {
            assert_eq!(controller.state, ControllerState::Done);
            assert_eq!(controller.broadcasts, 1, "controller {}", controller.node_id);
        }

        assert!(report.supervisor.start_signal_received);
        assert_eq!(report.supervisor.max_unit_time, 2);
        assert_eq!(report.supervisor.unknown_receivers, 0);
        assert_exactly_once(&report);

        assert_eq!(
            report.shutdown_order,
            vec![
                ShutdownStage::Senders,
                ShutdownStage::Controllers,
                ShutdownStage::Supervisor
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tree_without_initiator_only_counts_senders() {
        let mut config = fast_config(TopologyChoice::Tree);
        config.run.initiator = None;
        let report = run(config).await;

        assert_eq!(report.total_broadcasts(), 0);
        assert!(report
            .controllers
            .iter()
            .all(|c| c.state == ControllerState::Idle && c.events_processed == 0));
        assert_eq!(report.supervisor.total_messages, 5);
        assert_eq!(report.supervisor.max_unit_time, 2);
    }

    // =========================================================================
    // FULLY CONNECTED
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_mesh_broadcasts_are_bounded() {
        let report = run(fast_config(TopologyChoice::FullyConnected(4))).await;
        let n = 4u64;

        for controller in &report.controllers {
            assert!(controller.broadcasts <= 1);
            assert!(controller.peer_deliveries <= n - 1);
        }
        assert!(report.total_peer_deliveries() <= n * (n - 1));
        assert_eq!(report.total_broadcasts(), n);
        assert_eq!(report.supervisor.max_unit_time, 3);
        assert_exactly_once(&report);
    }

    // =========================================================================
    // RING
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ring_flood_along_neighbors() {
        let mut config = fast_config(TopologyChoice::Ring(4));
        config.network.peer_selection = PeerSelection::Neighbors;
        let report = run(config).await;

        // 0 → 1 → 2 → 3 → 0, each hop one delivery.
        for controller in &report.controllers {
            assert_eq!(controller.state, ControllerState::Done);
            assert_eq!(controller.broadcasts, 1);
            assert_eq!(controller.peer_deliveries, 1);
        }
        // The initiator sees the injection and the wave coming back round.
        let initiator = report.controllers.iter().find(|c| c.node_id == 0);
        assert_eq!(initiator.map(|c| c.events_processed), Some(2));
        assert_eq!(report.records_sent(), 4);
        assert_exactly_once(&report);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_report_serializes_to_json() {
        let mut config = fast_config(TopologyChoice::Ring(3));
        config.run.window = Duration::from_millis(500);
        let report = run(config).await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["controllers"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["shutdown_order"][2], "Supervisor");
        assert_eq!(json["run_id"], report.run_id.to_string());
        assert!(json["supervisor"]["elapsed"].as_f64().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_counters_reach_encoded_metrics() {
        let report = run(fast_config(TopologyChoice::Tree)).await;

        // Counters are process-wide; other runs may have added to them.
        assert!(
            wave_telemetry::RECORDS_DRAINED.get() >= report.supervisor.total_messages as f64
        );
        assert!(wave_telemetry::BROADCASTS.get() >= report.total_broadcasts() as f64);

        let encoded = wave_telemetry::encode_metrics().unwrap();
        assert!(encoded.contains("fw_supervisor_records_drained_total"));
        assert!(encoded.contains("fw_controller_broadcasts_total"));
        assert!(encoded.contains(r#"fw_controller_events_processed_total{node="0"}"#));
        assert!(encoded.contains("fw_run_elapsed_seconds"));
    }
}
