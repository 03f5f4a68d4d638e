//! Run counters and the values reported at shutdown.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Supervisor configuration.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Address of the `/start` endpoint.
    pub address: SocketAddr,
    /// Upper bound on draining after termination.
    pub drain_grace: Duration,
    /// Upper bound on reading one start connection.
    pub read_timeout: Duration,
}

impl SupervisorConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            drain_grace: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
        }
    }

    /// Builder method: set the drain grace timeout.
    pub fn with_drain_grace(mut self, drain_grace: Duration) -> Self {
        self.drain_grace = drain_grace;
        self
    }
}

/// Counters for one run. Zero at start, monotonic, never reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupervisorCounters {
    pub message_count: u64,
    pub max_unit_time: u32,
    /// Records whose receiver had no depth entry.
    pub unknown_receivers: u64,
}

impl SupervisorCounters {
    /// Count one record whose receiver sits at `depth`.
    ///
    /// Returns the running message count.
    pub fn apply(&mut self, depth: Option<u32>) -> u64 {
        self.message_count += 1;
        match depth {
            Some(depth) => self.max_unit_time = self.max_unit_time.max(depth),
            None => self.unknown_receivers += 1,
        }
        self.message_count
    }
}

/// When the run's wall clock started.
///
/// Starts at construction; a `/start` token moves it to the moment of
/// receipt, once.
#[derive(Clone, Copy, Debug)]
pub struct StartClock {
    started_at: Instant,
    start_signal_received: bool,
}

impl StartClock {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            start_signal_received: false,
        }
    }

    /// Record receipt of `/start`. Later calls keep the first instant.
    pub fn mark_started(&mut self, at: Instant) -> bool {
        if self.start_signal_received {
            return false;
        }
        self.started_at = at;
        self.start_signal_received = true;
        true
    }

    pub fn start_signal_received(&self) -> bool {
        self.start_signal_received
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for StartClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of counting one record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordSummary {
    pub message_count: u64,
    /// Depth of the receiver; absent for unknown receivers.
    pub unit_time: Option<u32>,
    pub real_time: Duration,
}

/// Final totals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SupervisorReport {
    pub total_messages: u64,
    pub max_unit_time: u32,
    pub unknown_receivers: u64,
    pub start_signal_received: bool,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_max_depth() {
        let mut counters = SupervisorCounters::default();
        for _ in 0..3 {
            counters.apply(Some(1));
        }
        assert_eq!(counters.message_count, 3);
        assert_eq!(counters.max_unit_time, 1);

        counters.apply(Some(2));
        counters.apply(Some(0));
        assert_eq!(counters.max_unit_time, 2);
    }

    #[test]
    fn test_unknown_receiver_counted_without_depth() {
        let mut counters = SupervisorCounters::default();
        counters.apply(Some(1));
        assert_eq!(counters.apply(None), 2);
        assert_eq!(counters.max_unit_time, 1);
        assert_eq!(counters.unknown_receivers, 1);
    }

    #[test]
    fn test_start_clock_marks_once() {
        let mut clock = StartClock::new();
        assert!(!clock.start_signal_received());
        assert!(clock.mark_started(Instant::now()));
        assert!(!clock.mark_started(Instant::now()));
        assert!(clock.start_signal_received());
    }
}
