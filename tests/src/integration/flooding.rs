//! # Controllers and Supervisor, Wired by Hand
//!
//! Exercises the subsystem APIs without the harness: controllers share one
//! intake queue, the supervisor drains it, the test raises termination.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use fw_01_topology::{compute_depths, Topology};
    use fw_02_controller::{
        ControllerActor, ControllerApi, ControllerConfig, PeerTransport, SendPolicy,
        TcpPeerTransport,
    };
    use fw_03_supervisor::{Supervisor, SupervisorConfig};
    use shared_bus::intake_channel;
    use shared_types::{ControllerState, FloodEvent};
    use tokio::sync::watch;
    use tokio::time::{sleep, timeout};

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_mesh_each_node_forwards_once() {
        let n = 4u32;
        let topology = Topology::fully_connected(n as usize).unwrap();
        let depths = compute_depths(&topology);

        let (intake_tx, intake_rx) = intake_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let supervisor = Arc::new(Supervisor::new(
            SupervisorConfig::new(loopback()),
            depths,
            shutdown_rx.clone(),
        ));
        let drain = {
            let supervisor = Arc::clone(&supervisor);
            tokio::spawn(async move { supervisor.drain(intake_rx).await })
        };

        let transport = Arc::new(TcpPeerTransport::new(SendPolicy::default()));
        let mut bound = Vec::new();
        for id in 0..n {
            let actor = ControllerActor::new(
                ControllerConfig::new(id, loopback()).with_initiator(id == 0),
                Vec::new(),
                intake_tx.clone(),
                Arc::clone(&transport),
                shutdown_rx.clone(),
            );
            bound.push(actor.bind().await.unwrap());
        }
        drop(intake_tx);

        let addrs: Vec<SocketAddr> = bound.iter().map(|b| b.local_addr()).collect();
        for (id, controller) in bound.iter().enumerate() {
            let peers = addrs
                .iter()
                .enumerate()
                .filter(|(peer, _)| *peer != id)
                .map(|(_, addr)| *addr)
                .collect();
            controller.set_peers(peers);

            let expected_state = if id == 0 {
                ControllerState::Initiator
            } else {
                ControllerState::Idle
            };
            assert_eq!(controller.actor().state(), expected_state);
        }

        let tasks: Vec<_> = bound
            .into_iter()
            .map(|controller| tokio::spawn(controller.run()))
            .collect();

        transport
            .send(addrs[0], &FloodEvent::Flood.encode())
            .await
            .unwrap();

        // 1 injection + every node forwarding to n-1 peers.
        let expected = 1 + u64::from(n * (n - 1));
        timeout(Duration::from_secs(10), async {
            while supervisor.counters().message_count < expected {
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("flood did not settle");

        shutdown_tx.send(true).unwrap();
        let mut broadcasts = 0;
        for task in tasks {
            let stats = task.await.unwrap();
            assert_eq!(stats.state, ControllerState::Done);
            assert_eq!(stats.broadcasts, 1);
            broadcasts += stats.broadcasts;
        }
        assert_eq!(broadcasts, u64::from(n));

        let report = timeout(Duration::from_secs(10), drain).await.unwrap().unwrap();
        assert_eq!(report.total_messages, expected);
        assert_eq!(report.max_unit_time, 3);
    }

    #[tokio::test]
    async fn test_repeated_floods_do_not_rebroadcast() {
        let (intake_tx, mut intake_rx) = intake_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        // Peer nobody listens on: every send fails fast, none aborts the rest.
        let dead_peer = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let actor = ControllerActor::new(
            ControllerConfig::new(2, loopback()),
            vec![dead_peer],
            intake_tx,
            Arc::new(TcpPeerTransport::new(SendPolicy::no_retry(
                Duration::from_millis(200),
            ))),
            shutdown_rx,
        );

        for _ in 0..3 {
            actor.handle_payload(b"I").await;
        }

        let stats = actor.stats();
        assert_eq!(stats.broadcasts, 1);
        assert_eq!(stats.peer_failures, 1);
        assert_eq!(stats.records_reported, 3);
        for _ in 0..3 {
            let record = intake_rx.recv().await.unwrap();
            assert_eq!((record.sender_id, record.receiver_id), (2, 2));
        }
    }
}
