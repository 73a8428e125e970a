//! Ingest pipeline: decoded batches flow through attribute resolution into
//! the window tally, with counters updated along the way.

mod batch;
mod metrics;
mod orchestrator;

pub use batch::{LogBatch, LogEntry, ResourceGroup, ScopeGroup};
pub use metrics::{AtomicIngestMetrics, IngestMetrics, MetricsSnapshot};
pub use orchestrator::{Acknowledgement, IngestOrchestrator};
