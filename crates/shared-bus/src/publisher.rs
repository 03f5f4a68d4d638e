//! # Record Publisher
//!
//! Defines the producing side of the intake queue.

use crate::subscriber::IntakeError;
use async_trait::async_trait;
use shared_types::ProcessingRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trait for pushing records toward the supervisor.
///
/// Controllers depend on this trait rather than on the channel so tests can
/// observe what a controller reports.
#[async_trait]
pub trait RecordPublisher: Send + Sync {
    /// Enqueue a record.
    ///
    /// Waits while the queue is full. Fails only when the consumer is gone.
    async fn publish(&self, record: ProcessingRecord) -> Result<(), IntakeError>;
}

/// Cloneable producer handle for the intake queue.
#[derive(Clone)]
pub struct IntakeSender {
    sender: mpsc::Sender<ProcessingRecord>,
    published: Arc<AtomicU64>,
}

impl IntakeSender {
    pub(crate) fn new(sender: mpsc::Sender<ProcessingRecord>, published: Arc<AtomicU64>) -> Self {
        Self { sender, published }
    }
}

#[async_trait]
impl RecordPublisher for IntakeSender {
    async fn publish(&self, record: ProcessingRecord) -> Result<(), IntakeError> {
        let sender_id = record.sender_id;
        let receiver_id = record.receiver_id;

        match self.sender.send(record).await {
            Ok(()) => {
                // Counted only after the record is actually in the queue.
                self.published.fetch_add(1, Ordering::SeqCst);
                debug!(sender_id, receiver_id, "Record enqueued");
                Ok(())
            }
            Err(_) => {
                warn!(sender_id, receiver_id, "Record dropped (intake closed)");
                Err(IntakeError::Closed)
            }
        }
    }
}
