//! Synthetic senders: one per node, one record per topology neighbor.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_bus::RecordPublisher;
use shared_types::{NodeId, ProcessingRecord};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::container::SenderSummary;

/// Uniform pause range between two records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Enqueue `ProcessingRecord{sender, neighbor}` for each neighbor in order,
/// pausing a random delay between records.
///
/// Stops early when termination is raised during a pause.
pub async fn run_sender<P: RecordPublisher>(
    node_id: NodeId,
    neighbors: Vec<NodeId>,
    publisher: P,
    delays: DelayRange,
    seed: u64,
    mut shutdown: watch::Receiver<bool>,
) -> SenderSummary {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sent = 0;

    for (index, receiver_id) in neighbors.iter().copied().enumerate() {
        if *shutdown.borrow() {
            break;
        }

        let record = ProcessingRecord::synthetic(node_id, receiver_id);
        info!("Controller {} sending: {}", node_id, record.message);
        match publisher.publish(record).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!("Sender {} stopped: {}", node_id, e);
                break;
            }
        }

        if index + 1 == neighbors.len() {
            break;
        }
        let pause = delays.sample(&mut rng);
        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = shutdown.changed() => {
                debug!(node_id, "Sender interrupted by termination");
                break;
            }
        }
    }

    let completed = sent as usize == neighbors.len();
    debug!(node_id, sent, completed, "Sender finished");
    SenderSummary {
        node_id,
        sent,
        completed,
    }
}
