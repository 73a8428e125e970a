//! Concurrency-safe counting over fixed time windows.
//!
//! All ingestion paths funnel resolved values into one shared accumulator.
//! A flush atomically swaps the live window for a fresh one under the same
//! lock the writers take, so every counted value lands in exactly one
//! window. Report construction and emission happen after the lock is
//! released and never block ingestion.

use super::clock::{ProductionClock, WindowClock, WindowTimestamp};
use super::render::render_table;
use super::report::WindowReport;
use ahash::AHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Accumulator for the window currently being filled.
struct WindowState {
    counts: AHashMap<String, u64>,
    started_at: WindowTimestamp,
    /// Doubles as the sequence number of the report this window will
    /// produce. Only a data-bearing flush advances it.
    generation: u64,
}

impl WindowState {
    fn fresh(generation: u64, started_at: WindowTimestamp) -> Self {
        WindowState {
            counts: AHashMap::with_capacity(64),
            started_at,
            generation,
        }
    }

    #[cfg(debug_assertions)]
    fn verify_invariants(&self) {
        assert!(self.generation >= 1, "window generations are 1-based");
        assert!(
            self.counts.values().all(|count| *count > 0),
            "accumulator must not hold zero counts"
        );
    }
}

/// What a flush attempt found.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// The window held data: it was reported and a fresh window installed.
    Flushed(WindowReport),
    /// The window was quiet: nothing was reset, the sequence did not
    /// advance, and the window start stayed where it was.
    Empty { generation: u64 },
}

impl FlushOutcome {
    pub fn report(&self) -> Option<&WindowReport> {
        match self {
            FlushOutcome::Flushed(report) => Some(report),
            FlushOutcome::Empty { .. } => None,
        }
    }
}

/// Shared windowed counter.
///
/// Writers call [`increment`](Self::increment) or
/// [`increment_many`](Self::increment_many) concurrently; a single periodic
/// driver calls [`flush`](Self::flush). Extra flush callers are safe: a
/// flush that loses the race simply observes an empty window.
pub struct WindowAggregator<C: WindowClock> {
    state: Mutex<WindowState>,
    window_duration: Duration,
    debug: bool,
    clock: C,
}

impl WindowAggregator<ProductionClock> {
    pub fn new(window_duration: Duration, debug: bool) -> Self {
        Self::with_clock(window_duration, debug, ProductionClock::new())
    }
}

impl<C: WindowClock> WindowAggregator<C> {
    pub fn with_clock(window_duration: Duration, debug: bool, clock: C) -> Self {
        let started_at = clock.now();
        WindowAggregator {
            state: Mutex::new(WindowState::fresh(1, started_at)),
            window_duration,
            debug,
            clock,
        }
    }

    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }

    /// Count one occurrence of a resolved value.
    pub fn increment(&self, value: &str) {
        let mut state = self.state.lock();
        if let Some(count) = state.counts.get_mut(value) {
            *count = count.saturating_add(1);
        } else {
            state.counts.insert(value.to_string(), 1);
        }
    }

    /// Count a batch of resolved values under one lock acquisition.
    pub fn increment_many(&self, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        for value in values {
            if let Some(count) = state.counts.get_mut(&value) {
                *count = count.saturating_add(1);
            } else {
                state.counts.insert(value, 1);
            }
        }
    }

    /// Read-only copy of the live window's counts, sorted by value.
    ///
    /// Observes without disturbing: repeated snapshots with no writes in
    /// between are identical.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let state = self.state.lock();
        state
            .counts
            .iter()
            .map(|(value, count)| (value.clone(), *count))
            .collect()
    }

    /// Sequence number the next data-bearing flush will report.
    pub fn current_generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Close the current window.
    ///
    /// With data present the accumulator is swapped for a fresh one and the
    /// drained counts become a [`WindowReport`]. A quiet window is left
    /// completely untouched so the next data-bearing report spans the quiet
    /// period. Two racing flushes serialize on the state lock; the loser
    /// sees the fresh window and takes the quiet path.
    pub fn flush(&self) -> FlushOutcome {
        let now = self.clock.now();
        let drained = {
            let mut state = self.state.lock();
            #[cfg(debug_assertions)]
            state.verify_invariants();
            if state.counts.is_empty() {
                let generation = state.generation;
                drop(state);
                info!(window = generation, "No data to report in this window");
                return FlushOutcome::Empty { generation };
            }
            let fresh = WindowState::fresh(state.generation + 1, now);
            std::mem::replace(&mut *state, fresh)
        };

        let report = WindowReport::from_counts(
            drained.generation,
            drained.started_at,
            now,
            drained.counts,
        );
        self.emit(&report);
        FlushOutcome::Flushed(report)
    }

    fn emit(&self, report: &WindowReport) {
        let counts_json =
            serde_json::to_string(&report.counts).unwrap_or_else(|_| String::from("{}"));
        info!(
            window = report.sequence,
            time_range = %report.time_range(),
            duration_ms = report.duration().as_millis() as u64,
            total_entries = report.total_entries,
            distinct_values = report.distinct_values(),
            counts = %counts_json,
            "Log attribute counts report"
        );

        if self.debug {
            println!();
            println!("{}", render_table(report));
            println!();
        }
    }
}
