//! # Sync Metrics
//!
//! Counters for the drains an orchestrator has run.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    pub total_drains: u64,
    pub successful_drains: u64,
    pub partial_drains: u64,
    pub failed_drains: u64,
    pub entries_processed: u64,
    pub entries_failed: u64,
    pub last_drain_duration: Option<Duration>,
    pub last_drain_at: Option<chrono::DateTime<chrono::Utc>>,
    last_drain_start: Option<Instant>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drain_start(&mut self) {
        self.last_drain_start = Some(Instant::now());
        self.total_drains += 1;
    }

    /// Record a finished pass with its per-entry counts
    pub fn record_drain_finish(&mut self, processed: usize, failed: usize) {
        self.finish();
        self.entries_processed += processed as u64;
        self.entries_failed += failed as u64;
        match (processed, failed) {
            (_, 0) => self.successful_drains += 1,
            (0, _) => self.failed_drains += 1,
            _ => self.partial_drains += 1,
        }
    }

    /// Record a drain that errored before finishing
    pub fn record_drain_error(&mut self) {
        self.finish();
        self.failed_drains += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_drains == 0 {
            0.0
        } else {
            self.successful_drains as f64 / self.total_drains as f64
        }
    }

    fn finish(&mut self) {
        if let Some(start) = self.last_drain_start.take() {
            self.last_drain_duration = Some(start.elapsed());
        }
        self.last_drain_at = Some(chrono::Utc::now());
    }
}
