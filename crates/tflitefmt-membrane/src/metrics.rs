//! Atomic counters for formatter observability.
//!
//! Relaxed ordering throughout: the counters are diagnostic only.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide formatting counters.
pub struct FormatMetrics {
    /// Format calls that reached the engine.
    pub formats: AtomicU64,
    /// Calls that returned NULL.
    pub failures: AtomicU64,
    /// Hardened-mode outputs cut at the length limit.
    pub truncations: AtomicU64,
    /// Malformed directives copied through literally.
    pub repairs: AtomicU64,
    /// Bytes handed to the host, terminators excluded.
    pub bytes_rendered: AtomicU64,
    /// Messages delivered by the error reporter.
    pub reporter_messages: AtomicU64,
}

impl FormatMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            formats: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            truncations: AtomicU64::new(0),
            repairs: AtomicU64::new(0),
            bytes_rendered: AtomicU64::new(0),
            reporter_messages: AtomicU64::new(0),
        }
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            formats: Self::get(&self.formats),
            failures: Self::get(&self.failures),
            truncations: Self::get(&self.truncations),
            repairs: Self::get(&self.repairs),
            bytes_rendered: Self::get(&self.bytes_rendered),
            reporter_messages: Self::get(&self.reporter_messages),
        }
    }
}

impl Default for FormatMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`FormatMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub formats: u64,
    pub failures: u64,
    pub truncations: u64,
    pub repairs: u64,
    pub bytes_rendered: u64,
    pub reporter_messages: u64,
}

static GLOBAL_METRICS: FormatMetrics = FormatMetrics::new();

#[must_use]
pub fn global_metrics() -> &'static FormatMetrics {
    &GLOBAL_METRICS
}
