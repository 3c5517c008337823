use std::sync::atomic::{AtomicU64, Ordering};

/// Live loader counters, shared by every load issued through one loader.
#[derive(Debug, Default)]
pub struct LoaderStats {
    fetch_attempts: AtomicU64,
    fetched_shards: AtomicU64,
    synthesized_shards: AtomicU64,
    failed_shards: AtomicU64,
    dropped_records: AtomicU64,
}

/// Point-in-time copy of `LoaderStats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoaderStatsSnapshot {
    /// Transport fetches issued.
    pub fetch_attempts: u64,
    /// Shards materialized from authentic data.
    pub fetched_shards: u64,
    /// Shards replaced by synthesized records.
    pub synthesized_shards: u64,
    /// Degraded shards surfaced as errors (strict policy).
    pub failed_shards: u64,
    /// Invalid records dropped from otherwise valid shards.
    pub dropped_records: u64,
}

impl LoaderStats {
    pub(crate) fn record_fetch_attempt(&self) {
        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetched(&self, dropped: usize) {
        self.fetched_shards.fetch_add(1, Ordering::Relaxed);
        self.dropped_records
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_synthesized(&self) {
        self.synthesized_shards.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed_shards.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> LoaderStatsSnapshot {
        LoaderStatsSnapshot {
            fetch_attempts: self.fetch_attempts.load(Ordering::Relaxed),
            fetched_shards: self.fetched_shards.load(Ordering::Relaxed),
            synthesized_shards: self.synthesized_shards.load(Ordering::Relaxed),
            failed_shards: self.failed_shards.load(Ordering::Relaxed),
            dropped_records: self.dropped_records.load(Ordering::Relaxed),
        }
    }
}

impl LoaderStatsSnapshot {
    /// Share of materialized shards that were synthesized, in `0.0..=1.0`.
    pub fn degraded_share(&self) -> f64 {
        let total = self.fetched_shards + self.synthesized_shards;
        if total == 0 {
            0.0
        } else {
            self.synthesized_shards as f64 / total as f64
        }
    }
}
