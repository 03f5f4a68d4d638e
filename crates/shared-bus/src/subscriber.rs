//! # Intake Receiver
//!
//! Defines the consuming side of the intake queue. There is exactly one
//! receiver per queue, owned by the supervisor.

use shared_types::ProcessingRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from intake operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// The other side of the queue is gone.
    #[error("Intake queue closed")]
    Closed,
}

/// The single consumer handle of the intake queue.
pub struct IntakeReceiver {
    receiver: mpsc::Receiver<ProcessingRecord>,
    published: Arc<AtomicU64>,
    received: u64,
}

impl IntakeReceiver {
    pub(crate) fn new(receiver: mpsc::Receiver<ProcessingRecord>, published: Arc<AtomicU64>) -> Self {
        Self {
            receiver,
            published,
            received: 0,
        }
    }

    /// Receive the next record.
    ///
    /// # Returns
    ///
    /// - `Some(record)` - The next record in FIFO order
    /// - `None` - Every producer handle has been dropped and the queue is empty
    pub async fn recv(&mut self) -> Option<ProcessingRecord> {
        let record = self.receiver.recv().await?;
        self.received += 1;
        Some(record)
    }

    /// Try to receive without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` - A record was available
    /// - `Ok(None)` - Queue is empty but producers remain
    /// - `Err(IntakeError::Closed)` - Queue is empty and all producers are gone
    pub fn try_recv(&mut self) -> Result<Option<ProcessingRecord>, IntakeError> {
        match self.receiver.try_recv() {
            Ok(record) => {
                self.received += 1;
                Ok(Some(record))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(IntakeError::Closed),
        }
    }

    /// Records enqueued but not yet received.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.published
            .load(Ordering::SeqCst)
            .saturating_sub(self.received)
    }
}
