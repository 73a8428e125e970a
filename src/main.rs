//! Log attribute tally pipeline with a built-in traffic generator.
//!
//! Runs the full ingest path against seeded synthetic export batches so the
//! windowed reports can be observed without a transport in front.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | TALLY_ATTRIBUTE_KEY | service.name | Attribute key to resolve and count |
//! | TALLY_WINDOW_MS | 10000 | Counting window length in milliseconds |
//! | TALLY_DEBUG | false | Verbose logging plus the console report table |
//! | TALLY_DEMO_INTERVAL_MS | 250 | Delay between synthetic export requests |
//! | TALLY_DEMO_SEED | 42 | Seed for the synthetic traffic generator |

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use otlp_tally::attrs::{AttributeResolver, AttributeSet};
use otlp_tally::config::TallyConfig;
use otlp_tally::ingest::{
    AtomicIngestMetrics, IngestOrchestrator, LogBatch, LogEntry, ResourceGroup, ScopeGroup,
};
use otlp_tally::window::{spawn_window_flusher, WindowAggregator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

const DEFAULT_DEMO_INTERVAL_MS: u64 = 250;
const DEFAULT_DEMO_SEED: u64 = 42;

const SERVICES: [&str; 5] = ["checkout", "payments", "inventory", "search", "auth"];
const SEVERITIES: [&str; 4] = ["DEBUG", "INFO", "WARN", "ERROR"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TallyConfig::from_env()?;

    if config.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let demo_interval_ms = std::env::var("TALLY_DEMO_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEMO_INTERVAL_MS)
        .max(1);
    let demo_seed = std::env::var("TALLY_DEMO_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEMO_SEED);

    println!("OTLP Log Attribute Tally");
    println!("========================");
    println!();
    println!("Configuration:");
    println!("  Attribute key: {}", config.attribute_key);
    println!("  Window: {:?}", config.window_duration);
    println!("  Debug: {}", config.debug);
    println!("  Demo interval: {}ms (seed {})", demo_interval_ms, demo_seed);
    println!();
    println!("Press Ctrl+C to shutdown gracefully");
    println!();

    info!(
        attribute_key = %config.attribute_key,
        window_ms = config.window_duration.as_millis() as u64,
        debug = config.debug,
        "Starting tally pipeline"
    );

    let aggregator = Arc::new(WindowAggregator::new(config.window_duration, config.debug));
    let metrics = Arc::new(AtomicIngestMetrics::new());
    let orchestrator = IngestOrchestrator::new(
        AttributeResolver::new(config.attribute_key.clone()),
        aggregator.clone(),
        metrics.clone(),
    );

    let (flusher_handle, flusher_task) = spawn_window_flusher(aggregator);

    let mut rng = ChaCha8Rng::seed_from_u64(demo_seed);
    let mut traffic = tokio::time::interval(Duration::from_millis(demo_interval_ms));

    loop {
        tokio::select! {
            _ = traffic.tick() => {
                let batch = synthetic_batch(&mut rng, orchestrator.attribute_key());
                orchestrator.process(Some(&batch));
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                println!("\nShutdown signal received, flushing final window...");
                break;
            }
        }
    }

    flusher_handle.shutdown().await;
    let _ = flusher_task.await;

    let totals = metrics.snapshot();
    println!();
    println!("Ingest totals:");
    println!("  Requests: {}", totals.requests_total);
    println!("  Entries: {}", totals.entries_processed_total);
    println!(
        "  Distinct attribute values: {}",
        totals.attribute_values_total.len()
    );

    println!("Pipeline shutdown complete");
    info!("Pipeline shutdown complete");

    Ok(())
}

/// One synthetic export request, shaped like real traffic: most groups
/// carry the key at resource level, some entries override it, and a slice
/// arrives with no attributes at all and lands on the sentinel.
fn synthetic_batch(rng: &mut ChaCha8Rng, attribute_key: &str) -> LogBatch {
    let now_nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut batch = LogBatch::new();
    for _ in 0..rng.gen_range(1..=2) {
        let service = SERVICES[rng.gen_range(0..SERVICES.len())];
        let resource = if rng.gen_bool(0.85) {
            Some(
                AttributeSet::new()
                    .with(attribute_key, service)
                    .with("deployment.environment", "prod"),
            )
        } else {
            None
        };

        let mut group = ResourceGroup::new(resource);
        for _ in 0..rng.gen_range(1..=2) {
            let scope = if rng.gen_bool(0.2) {
                Some(AttributeSet::new().with("otel.scope.name", "demo.instrumentation"))
            } else {
                None
            };

            let mut scope_group = ScopeGroup::new(scope);
            for _ in 0..rng.gen_range(1..=8) {
                let mut entry = LogEntry::new()
                    .with_timestamp(now_nanos)
                    .with_severity(SEVERITIES[rng.gen_range(0..SEVERITIES.len())])
                    .with_body("synthetic export entry");
                if rng.gen_bool(0.15) {
                    // Entry-level value outranks the resource-level one.
                    let canary = SERVICES[rng.gen_range(0..SERVICES.len())];
                    entry = entry.with_attributes(
                        AttributeSet::new().with(attribute_key, format!("{}-canary", canary)),
                    );
                }
                scope_group = scope_group.with_entry(entry);
            }
            group = group.with_scope(scope_group);
        }
        batch = batch.with_group(group);
    }
    batch
}
