//! Ingest counters.
//!
//! The counters sit behind an injected trait rather than a process-global
//! registry, so tests substitute a recording fake and two pipelines in one
//! process never share state.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the ingest path reports into. All methods are cheap and
/// callable from concurrent request handlers.
pub trait IngestMetrics: Send + Sync {
    /// One inbound export request received.
    fn incr_requests(&self);
    /// `n` log entries processed within a request.
    fn add_entries(&self, n: u64);
    /// One occurrence of a resolved attribute value.
    fn incr_value_seen(&self, value: &str);
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub entries_processed_total: u64,
    /// Per-value occurrence counts, sorted by value.
    pub attribute_values_total: BTreeMap<String, u64>,
}

/// In-process counter implementation.
#[derive(Default)]
pub struct AtomicIngestMetrics {
    requests_total: AtomicU64,
    entries_processed_total: AtomicU64,
    attribute_values_total: Mutex<AHashMap<String, u64>>,
}

impl AtomicIngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let values = self.attribute_values_total.lock();
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            entries_processed_total: self.entries_processed_total.load(Ordering::Relaxed),
            attribute_values_total: values
                .iter()
                .map(|(value, count)| (value.clone(), *count))
                .collect(),
        }
    }
}

impl IngestMetrics for AtomicIngestMetrics {
    fn incr_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn add_entries(&self, n: u64) {
        self.entries_processed_total.fetch_add(n, Ordering::Relaxed);
    }

    fn incr_value_seen(&self, value: &str) {
        let mut values = self.attribute_values_total.lock();
        if let Some(count) = values.get_mut(value) {
            *count = count.saturating_add(1);
        } else {
            values.insert(value.to_string(), 1);
        }
    }
}
