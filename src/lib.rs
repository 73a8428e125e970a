pub mod attrs;
pub mod config;
pub mod ingest;
pub mod window;

pub use attrs::{AttributeResolver, AttributeSet, AttributeValue, KeyValue, UNKNOWN_VALUE};
pub use config::{ConfigError, TallyConfig};
pub use ingest::{
    Acknowledgement, AtomicIngestMetrics, IngestMetrics, IngestOrchestrator, LogBatch, LogEntry,
    MetricsSnapshot, ResourceGroup, ScopeGroup,
};
pub use window::{
    spawn_window_flusher, FlushOutcome, FlusherHandle, ProductionClock, SimulatedClock,
    WindowAggregator, WindowClock, WindowReport,
};
