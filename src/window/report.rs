//! Immutable snapshot of one completed counting window.

use super::clock::WindowTimestamp;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Count and share of one resolved value within a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueCount {
    pub count: u64,
    /// Share of the window total, 0.0 to 100.0.
    pub percentage: f64,
}

/// Everything known about one flushed window.
///
/// `counts` is ordered by value so reports render and serialize
/// deterministically regardless of accumulation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
    /// 1-based window sequence number. Quiet windows do not consume one.
    pub sequence: u64,
    pub window_start: WindowTimestamp,
    pub window_end: WindowTimestamp,
    pub total_entries: u64,
    pub counts: BTreeMap<String, ValueCount>,
}

impl WindowReport {
    /// Build a report from raw per-value counts.
    ///
    /// Only called with at least one entry; percentages are computed against
    /// the overall total.
    pub(crate) fn from_counts(
        sequence: u64,
        window_start: WindowTimestamp,
        window_end: WindowTimestamp,
        raw: impl IntoIterator<Item = (String, u64)>,
    ) -> Self {
        let mut counts: BTreeMap<String, ValueCount> = raw
            .into_iter()
            .map(|(value, count)| (value, ValueCount { count, percentage: 0.0 }))
            .collect();
        let total_entries: u64 = counts.values().map(|vc| vc.count).sum();
        debug_assert!(total_entries > 0, "report built from an empty window");

        if total_entries > 0 {
            for value_count in counts.values_mut() {
                value_count.percentage =
                    (value_count.count as f64 / total_entries as f64) * 100.0;
            }
        }

        WindowReport {
            sequence,
            window_start,
            window_end,
            total_entries,
            counts,
        }
    }

    pub fn duration(&self) -> Duration {
        self.window_end.saturating_sub(self.window_start)
    }

    pub fn distinct_values(&self) -> usize {
        self.counts.len()
    }

    /// `HH:MM:SS - HH:MM:SS` span for logs and the console table.
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.window_start.hhmmss(), self.window_end.hhmmss())
    }
}
