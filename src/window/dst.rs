//! Deterministic simulation testing for the window aggregator.
//!
//! Drives `WindowAggregator` through randomized interleavings of
//! increments, batches, flushes, snapshots and clock jumps, all from a
//! seeded generator so any failure replays exactly.
//!
//! ## Design
//!
//! The harness keeps a shadow model of the live window alongside the real
//! aggregator. After every flush and snapshot the aggregator's output is
//! compared against expectations computed from the shadow; at the end of a
//! run a conservation check confirms no counted entry was lost or
//! duplicated across window swaps.
//!
//! ## Usage
//!
//! ```rust,ignore
//! for seed in 0..100 {
//!     let mut harness = WindowDSTHarness::with_seed(seed);
//!     harness.run(500);
//!     assert!(harness.result().is_success(), "Seed {} failed", seed);
//! }
//! ```

use super::aggregator::{FlushOutcome, WindowAggregator};
use super::clock::SimulatedClock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for window DST
#[derive(Debug, Clone)]
pub struct WindowDSTConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of distinct values in the value space
    pub num_values: usize,
    /// Largest batch handed to `increment_many`
    pub max_batch: usize,

    // Operation weights (must sum to ~100)
    pub weight_increment: u64,
    pub weight_batch: u64,
    pub weight_flush: u64,
    pub weight_snapshot: u64,
    pub weight_advance: u64,
}

impl Default for WindowDSTConfig {
    fn default() -> Self {
        WindowDSTConfig {
            seed: 0,
            num_values: 12,
            max_batch: 32,
            weight_increment: 40,
            weight_batch: 20,
            weight_flush: 15,
            weight_snapshot: 15,
            weight_advance: 10,
        }
    }
}

impl WindowDSTConfig {
    /// Standard configuration with given seed
    pub fn new(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            ..Default::default()
        }
    }

    /// Calm configuration - few values, long stretches between flushes
    pub fn calm(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            num_values: 4,
            max_batch: 8,
            weight_increment: 55,
            weight_flush: 5,
            weight_advance: 5,
            ..Default::default()
        }
    }

    /// Chaos configuration - wide value space, flush-heavy
    pub fn chaos(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            num_values: 40,
            max_batch: 64,
            weight_increment: 25,
            weight_flush: 30,
            weight_snapshot: 10,
            weight_advance: 15,
            ..Default::default()
        }
    }

    fn total_weight(&self) -> u64 {
        self.weight_increment
            + self.weight_batch
            + self.weight_flush
            + self.weight_snapshot
            + self.weight_advance
    }
}

/// Operation type for logging
#[derive(Debug, Clone)]
pub enum WindowOp {
    Increment(String),
    Batch(String),
    Flush(String),
    Snapshot(String),
    Advance(String),
}

/// Result of a window DST run
#[derive(Debug, Clone)]
pub struct WindowDSTResult {
    pub seed: u64,
    pub total_operations: u64,
    pub increment_ops: u64,
    pub batch_ops: u64,
    pub flush_ops: u64,
    pub snapshot_ops: u64,
    pub advance_ops: u64,
    pub entries_counted: u64,
    pub windows_reported: u64,
    pub invariant_violations: Vec<String>,
    pub last_op: Option<WindowOp>,
}

impl WindowDSTResult {
    pub fn new(seed: u64) -> Self {
        WindowDSTResult {
            seed,
            total_operations: 0,
            increment_ops: 0,
            batch_ops: 0,
            flush_ops: 0,
            snapshot_ops: 0,
            advance_ops: 0,
            entries_counted: 0,
            windows_reported: 0,
            invariant_violations: Vec::new(),
            last_op: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Seed {}: {} ops (inc:{}, batch:{}, flush:{}, snap:{}, adv:{}), {} entries in {} windows, {} violations",
            self.seed,
            self.total_operations,
            self.increment_ops,
            self.batch_ops,
            self.flush_ops,
            self.snapshot_ops,
            self.advance_ops,
            self.entries_counted,
            self.windows_reported,
            self.invariant_violations.len()
        )
    }
}

// =============================================================================
// Shadow State - Reference Model
// =============================================================================

/// Expected contents of the live window, tracked alongside the aggregator
struct ShadowWindow {
    pending: BTreeMap<String, u64>,
    pending_total: u64,
    reported_total: u64,
    next_sequence: u64,
    window_started_ms: u64,
}

impl ShadowWindow {
    fn new(started_ms: u64) -> Self {
        ShadowWindow {
            pending: BTreeMap::new(),
            pending_total: 0,
            reported_total: 0,
            next_sequence: 1,
            window_started_ms: started_ms,
        }
    }

    fn count(&mut self, value: String) {
        *self.pending.entry(value).or_insert(0) += 1;
        self.pending_total += 1;
    }

    fn close_window(&mut self, now_ms: u64) {
        self.reported_total += self.pending_total;
        self.pending.clear();
        self.pending_total = 0;
        self.next_sequence += 1;
        self.window_started_ms = now_ms;
    }
}

// =============================================================================
// DST Harness
// =============================================================================

const DST_START_MS: u64 = 1_000_000;

/// DST harness for WindowAggregator
pub struct WindowDSTHarness {
    config: WindowDSTConfig,
    rng: ChaCha8Rng,
    clock: SimulatedClock,
    aggregator: WindowAggregator<SimulatedClock>,
    shadow: ShadowWindow,
    result: WindowDSTResult,
}

impl WindowDSTHarness {
    pub fn new(config: WindowDSTConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let clock = SimulatedClock::new(DST_START_MS);
        let aggregator =
            WindowAggregator::with_clock(Duration::from_secs(10), false, clock.clone());
        WindowDSTHarness {
            result: WindowDSTResult::new(config.seed),
            config,
            rng,
            clock,
            aggregator,
            shadow: ShadowWindow::new(DST_START_MS),
        }
    }

    /// Create with just a seed (uses default config)
    pub fn with_seed(seed: u64) -> Self {
        Self::new(WindowDSTConfig::new(seed))
    }

    /// Value selection with a quadratic bias toward low indices, so some
    /// values run hot the way real attribute traffic does
    fn random_value(&mut self) -> String {
        let a = self.rng.gen_range(0..self.config.num_values);
        let b = self.rng.gen_range(0..self.config.num_values);
        format!("value-{:02}", a.min(b))
    }

    fn select_op(&mut self) -> u64 {
        let total = self.config.total_weight();
        if total == 0 {
            return 0;
        }
        self.rng.gen_range(0..total)
    }

    fn run_single_op(&mut self) {
        let roll = self.select_op();
        let mut threshold = 0;

        threshold += self.config.weight_increment;
        if roll < threshold {
            self.run_increment_op();
            return;
        }
        threshold += self.config.weight_batch;
        if roll < threshold {
            self.run_batch_op();
            return;
        }
        threshold += self.config.weight_flush;
        if roll < threshold {
            self.run_flush_op();
            return;
        }
        threshold += self.config.weight_snapshot;
        if roll < threshold {
            self.run_snapshot_op();
            return;
        }
        // Remaining = clock advance
        self.run_advance_op();
    }

    fn run_increment_op(&mut self) {
        let value = self.random_value();
        self.result.increment_ops += 1;
        self.result.last_op = Some(WindowOp::Increment(value.clone()));

        self.aggregator.increment(&value);
        self.shadow.count(value);
        self.result.entries_counted += 1;
    }

    fn run_batch_op(&mut self) {
        // Zero-length batches are deliberately in range: they must be no-ops.
        let len = self.rng.gen_range(0..=self.config.max_batch);
        self.result.batch_ops += 1;
        self.result.last_op = Some(WindowOp::Batch(format!("{} values", len)));

        let values: Vec<String> = (0..len).map(|_| self.random_value()).collect();
        self.aggregator.increment_many(values.clone());
        for value in values {
            self.shadow.count(value);
        }
        self.result.entries_counted += len as u64;
    }

    fn run_flush_op(&mut self) {
        self.result.flush_ops += 1;
        self.result.last_op = Some(WindowOp::Flush(format!(
            "window {} holding {} entries",
            self.shadow.next_sequence, self.shadow.pending_total
        )));

        let now_ms = self.clock.current_ms();
        match self.aggregator.flush() {
            FlushOutcome::Flushed(report) => {
                self.result.windows_reported += 1;

                if self.shadow.pending_total == 0 {
                    self.violation("flush produced a report from a window the model holds empty");
                }
                if report.sequence != self.shadow.next_sequence {
                    self.violation(&format!(
                        "report sequence {} but model expects {}",
                        report.sequence, self.shadow.next_sequence
                    ));
                }
                if report.total_entries != self.shadow.pending_total {
                    self.violation(&format!(
                        "report total {} but model holds {}",
                        report.total_entries, self.shadow.pending_total
                    ));
                }
                if report.window_start.as_millis() != self.shadow.window_started_ms {
                    self.violation(&format!(
                        "window start {} but model expects {}",
                        report.window_start.as_millis(),
                        self.shadow.window_started_ms
                    ));
                }
                if report.window_end.as_millis() != now_ms {
                    self.violation(&format!(
                        "window end {} but clock reads {}",
                        report.window_end.as_millis(),
                        now_ms
                    ));
                }

                let reported: BTreeMap<String, u64> = report
                    .counts
                    .iter()
                    .map(|(value, vc)| (value.clone(), vc.count))
                    .collect();
                if reported != self.shadow.pending {
                    self.violation(&format!(
                        "report counts {:?} diverge from model {:?}",
                        reported, self.shadow.pending
                    ));
                }

                let percentage_sum: f64 =
                    report.counts.values().map(|vc| vc.percentage).sum();
                if (percentage_sum - 100.0).abs() > 1e-6 {
                    self.violation(&format!(
                        "percentages sum to {} instead of 100",
                        percentage_sum
                    ));
                }
                for (value, vc) in &report.counts {
                    let expected =
                        (vc.count as f64 / report.total_entries as f64) * 100.0;
                    if (vc.percentage - expected).abs() > 1e-9 {
                        self.violation(&format!(
                            "percentage for {} is {} but should be {}",
                            value, vc.percentage, expected
                        ));
                    }
                }

                self.shadow.close_window(now_ms);
            }
            FlushOutcome::Empty { generation } => {
                if self.shadow.pending_total != 0 {
                    self.violation(&format!(
                        "flush found nothing but model holds {} entries",
                        self.shadow.pending_total
                    ));
                }
                if generation != self.shadow.next_sequence {
                    self.violation(&format!(
                        "empty flush at generation {} but model expects {}",
                        generation, self.shadow.next_sequence
                    ));
                }
                // Quiet window: the model keeps its start timestamp too.
            }
        }
    }

    fn run_snapshot_op(&mut self) {
        self.result.snapshot_ops += 1;
        self.result.last_op = Some(WindowOp::Snapshot(format!(
            "{} pending entries",
            self.shadow.pending_total
        )));

        let snapshot = self.aggregator.snapshot();
        if snapshot != self.shadow.pending {
            self.violation(&format!(
                "snapshot {:?} diverges from model {:?}",
                snapshot, self.shadow.pending
            ));
        }

        // Observation must not disturb the window.
        let again = self.aggregator.snapshot();
        if again != snapshot {
            self.violation("repeated snapshot observed a different window");
        }
    }

    fn run_advance_op(&mut self) {
        let ms = self.rng.gen_range(1..=5_000u64);
        self.result.advance_ops += 1;
        self.result.last_op = Some(WindowOp::Advance(format!("+{}ms", ms)));
        self.clock.advance_ms(ms);
    }

    fn violation(&mut self, msg: &str) {
        self.result.invariant_violations.push(format!(
            "Op #{}: {:?} - {}",
            self.result.total_operations, self.result.last_op, msg
        ));
    }

    /// Every counted entry is either already reported or still pending,
    /// exactly once
    fn check_conservation(&mut self) {
        let accounted = self.shadow.reported_total + self.shadow.pending_total;
        if accounted != self.result.entries_counted {
            self.violation(&format!(
                "conservation broken: {} counted but {} accounted for",
                self.result.entries_counted, accounted
            ));
        }

        let live: u64 = self.aggregator.snapshot().values().sum();
        if live != self.shadow.pending_total {
            self.violation(&format!(
                "live window holds {} entries but model holds {}",
                live, self.shadow.pending_total
            ));
        }
    }

    /// Run specified number of operations
    pub fn run(&mut self, operations: usize) {
        for _ in 0..operations {
            self.result.total_operations += 1;
            self.run_single_op();

            // Stop early if we hit a violation
            if !self.result.invariant_violations.is_empty() {
                break;
            }
        }
        if self.result.invariant_violations.is_empty() {
            self.check_conservation();
        }
    }

    /// Get the result
    pub fn result(&self) -> &WindowDSTResult {
        &self.result
    }
}

/// Run a batch of DST tests with different seeds
pub fn run_window_batch(
    start_seed: u64,
    num_seeds: usize,
    ops_per_seed: usize,
    config_fn: fn(u64) -> WindowDSTConfig,
) -> Vec<WindowDSTResult> {
    (0..num_seeds)
        .map(|i| {
            let seed = start_seed + i as u64;
            let config = config_fn(seed);
            let mut harness = WindowDSTHarness::new(config);
            harness.run(ops_per_seed);
            harness.result().clone()
        })
        .collect()
}

/// Summarize batch results
pub fn summarize_window_batch(results: &[WindowDSTResult]) -> String {
    let total = results.len();
    let passed = results.iter().filter(|r| r.is_success()).count();
    let failed = total - passed;
    let total_ops: u64 = results.iter().map(|r| r.total_operations).sum();
    let total_entries: u64 = results.iter().map(|r| r.entries_counted).sum();

    let mut summary = format!(
        "Window DST Summary\n\
         ==================\n\
         Seeds: {} total, {} passed, {} failed\n\
         Total operations: {}\n\
         Total entries: {}\n",
        total, passed, failed, total_ops, total_entries
    );

    if failed > 0 {
        summary.push_str("\nFailed seeds:\n");
        for result in results.iter().filter(|r| !r.is_success()) {
            summary.push_str(&format!("  Seed {}: {}\n", result.seed, result.summary()));
            for violation in &result.invariant_violations {
                summary.push_str(&format!("    - {}\n", violation));
            }
        }
    }

    summary
}
