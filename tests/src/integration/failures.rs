//! # Failure Paths
//!
//! Startup errors abort the run; early termination still shuts down in
//! order.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use flood_runtime::container::{ShutdownStage, TopologyChoice};
    use flood_runtime::FloodRuntime;
    use tempfile::NamedTempFile;
    use tokio::time::timeout;

    use crate::integration::fast_config;

    #[tokio::test]
    async fn test_supervisor_port_in_use_aborts_run() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = fast_config(TopologyChoice::Tree);
        config.network.supervisor_port = taken.local_addr().unwrap().port();

        let err = FloodRuntime::new(config).run().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to start supervisor"));
    }

    #[tokio::test]
    async fn test_controller_port_in_use_aborts_run() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let mut config = fast_config(TopologyChoice::Ring(2));
        // Controller 0 collides, controller 1 takes the next port.
        config.network.base_port = port;

        let err = FloodRuntime::new(config).run().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to start controller 0"));
    }

    #[tokio::test]
    async fn test_unreachable_node_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"0": [1], "1": [], "2": []}"#).unwrap();

        let config = fast_config(TopologyChoice::File(file.path().to_path_buf()));
        let err = FloodRuntime::new(config).run().await.unwrap_err();

        assert!(format!("{:#}", err).contains("unreachable"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_early_termination_keeps_shutdown_order() {
        let mut config = fast_config(TopologyChoice::Tree);
        config.run.window = Duration::from_secs(60);
        config.run.min_delay = Duration::from_secs(30);
        config.run.max_delay = Duration::from_secs(30);

        let runtime = FloodRuntime::new(config);
        let handle = runtime.shutdown_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            handle.terminate();
        });

        let report = timeout(Duration::from_secs(20), runtime.run())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            report.shutdown_order,
            vec![
                ShutdownStage::Senders,
                ShutdownStage::Controllers,
                ShutdownStage::Supervisor
            ]
        );
        // Long pauses: senders 0 and 1 got exactly one record out each.
        assert_eq!(report.records_sent(), 2);
        assert!(report.senders.iter().any(|s| !s.completed));
        let reported: u64 = report.controllers.iter().map(|c| c.records_reported).sum();
        assert_eq!(report.supervisor.total_messages, report.records_sent() + reported);
    }
}
