//! Window Aggregator Deterministic Simulation Tests
//!
//! DST tests for WindowAggregator with multiple seeds.
//! These tests verify that windowed counting maintains invariants
//! (conservation, sequence numbering, percentage math) across random
//! operation sequences on simulated time.

use otlp_tally::window::{
    run_window_batch, summarize_window_batch, WindowDSTConfig, WindowDSTHarness,
};

// =============================================================================
// Calm Tests (200 ops) - Quick Smoke Tests
// =============================================================================

#[test]
fn test_window_dst_calm_100_seeds() {
    let results = run_window_batch(0, 100, 200, WindowDSTConfig::calm);
    let summary = summarize_window_batch(&results);
    println!("{}", summary);

    let passed = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(passed, 100, "All 100 calm seeds should pass");
}

// =============================================================================
// Moderate Tests (1000 ops) - Standard Coverage
// =============================================================================

#[test]
fn test_window_dst_moderate_50_seeds() {
    let results = run_window_batch(0, 50, 1000, WindowDSTConfig::new);
    let summary = summarize_window_batch(&results);
    println!("{}", summary);

    let passed = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(passed, 50, "All 50 moderate seeds should pass");
}

// =============================================================================
// Chaos Tests (2000 ops) - Stress Testing
// =============================================================================

#[test]
fn test_window_dst_chaos_25_seeds() {
    let results = run_window_batch(0, 25, 2000, WindowDSTConfig::chaos);
    let summary = summarize_window_batch(&results);
    println!("{}", summary);

    let passed = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(passed, 25, "All 25 chaos seeds should pass");
}

// =============================================================================
// Stress Tests - High Operation Count
// =============================================================================

#[test]
fn test_window_dst_stress_5000_ops() {
    let mut harness = WindowDSTHarness::with_seed(12345);
    harness.run(5000);
    let result = harness.result();
    println!("Stress 5000 ops: {}", result.summary());
    assert!(result.is_success(), "5000 ops should maintain invariants");
}

// =============================================================================
// Edge Case Tests
// =============================================================================

#[test]
fn test_window_dst_tiny_value_space() {
    // Very few distinct values = heavy per-value collisions within windows
    let config = WindowDSTConfig {
        seed: 88888,
        num_values: 2,
        ..Default::default()
    };

    let mut harness = WindowDSTHarness::new(config);
    harness.run(1000);
    let result = harness.result();
    println!("Tiny value space (2 values): {}", result.summary());
    assert!(
        result.is_success(),
        "Tiny value space should maintain invariants"
    );
}

#[test]
fn test_window_dst_flush_heavy() {
    // Flushes dominate, so most windows close empty or nearly empty
    let config = WindowDSTConfig {
        seed: 2024,
        weight_increment: 10,
        weight_batch: 5,
        weight_flush: 70,
        weight_snapshot: 5,
        weight_advance: 10,
        ..Default::default()
    };

    let mut harness = WindowDSTHarness::new(config);
    harness.run(1000);
    let result = harness.result();
    println!("Flush heavy: {}", result.summary());
    assert!(result.is_success(), "Flush-heavy mix should maintain invariants");
}

#[test]
fn test_window_dst_all_op_types_exercised() {
    let config = WindowDSTConfig::new(42);
    let mut harness = WindowDSTHarness::new(config);
    harness.run(2000);
    let result = harness.result();

    println!("{}", result.summary());
    assert!(result.is_success());

    assert!(result.increment_ops > 0, "Increment ops should be exercised");
    assert!(result.batch_ops > 0, "Batch ops should be exercised");
    assert!(result.flush_ops > 0, "Flush ops should be exercised");
    assert!(result.snapshot_ops > 0, "Snapshot ops should be exercised");
    assert!(result.advance_ops > 0, "Advance ops should be exercised");
}

// =============================================================================
// Mixed Configuration Tests
// =============================================================================

#[test]
fn test_window_dst_50_seeds_mixed_configs() {
    let mut all_passed = true;
    let mut failures = Vec::new();

    for seed in 0..50 {
        let config = match seed % 3 {
            0 => WindowDSTConfig::new(seed),
            1 => WindowDSTConfig::calm(seed),
            _ => WindowDSTConfig::chaos(seed),
        };

        let mut harness = WindowDSTHarness::new(config);
        harness.run(500);
        let result = harness.result();

        if !result.is_success() {
            all_passed = false;
            failures.push(result.clone());
        }
    }

    if !all_passed {
        for f in &failures {
            println!("FAILED: {}", f.summary());
            for v in &f.invariant_violations {
                println!("  {}", v);
            }
        }
    }

    assert!(all_passed, "{} seeds failed", failures.len());
}

// =============================================================================
// Longer Tests (ignored by default for CI speed)
// =============================================================================

#[test]
#[ignore]
fn test_window_dst_500_seeds() {
    let results = run_window_batch(0, 500, 1000, WindowDSTConfig::new);
    let summary = summarize_window_batch(&results);
    println!("{}", summary);

    let passed = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(passed, 500, "All 500 seeds should pass");
}

#[test]
#[ignore]
fn test_window_dst_stress_10000_ops() {
    let mut harness = WindowDSTHarness::with_seed(31415);
    harness.run(10000);
    let result = harness.result();
    println!("Stress 10000 ops: {}", result.summary());
    assert!(result.is_success(), "10000 ops should maintain invariants");
}
