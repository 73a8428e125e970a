use super::batch::LogBatch;
use super::metrics::IngestMetrics;
use crate::attrs::AttributeResolver;
use crate::window::{WindowAggregator, WindowClock};
use std::sync::Arc;
use tracing::{debug, info};

/// Response handed back to the transport.
///
/// Ingestion never rejects: every entry is counted, if only under the
/// sentinel value, so the response always reports full acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub accepted_all: bool,
    pub rejected_entries: u64,
    pub error_message: Option<String>,
}

impl Acknowledgement {
    pub fn accept_all() -> Self {
        Acknowledgement {
            accepted_all: true,
            rejected_entries: 0,
            error_message: None,
        }
    }
}

/// Per-request composition of the resolver, the window tally and the
/// metrics counters.
///
/// One orchestrator serves all requests; it holds no per-request state and
/// every method takes `&self`.
pub struct IngestOrchestrator<C: WindowClock> {
    resolver: AttributeResolver,
    aggregator: Arc<WindowAggregator<C>>,
    metrics: Arc<dyn IngestMetrics>,
}

impl<C: WindowClock> IngestOrchestrator<C> {
    pub fn new(
        resolver: AttributeResolver,
        aggregator: Arc<WindowAggregator<C>>,
        metrics: Arc<dyn IngestMetrics>,
    ) -> Self {
        IngestOrchestrator {
            resolver,
            aggregator,
            metrics,
        }
    }

    pub fn attribute_key(&self) -> &str {
        self.resolver.attribute_key()
    }

    /// Ingest one decoded batch.
    ///
    /// `None` models a request that decoded to no body at all: it is
    /// acknowledged without touching the counters. An empty batch is a real
    /// request and counts as one, with zero entries.
    pub fn process(&self, batch: Option<&LogBatch>) -> Acknowledgement {
        let Some(batch) = batch else {
            info!("Received absent export request");
            return Acknowledgement::accept_all();
        };

        let entry_count = batch.entry_count();
        let values = self.resolve_values(batch);
        debug!(
            entries = entry_count,
            groups = batch.groups.len(),
            "Processing export request"
        );

        self.metrics.incr_requests();
        self.metrics.add_entries(entry_count);
        for value in &values {
            self.metrics.incr_value_seen(value);
        }

        self.aggregator.increment_many(values);

        Acknowledgement::accept_all()
    }

    /// One resolved value per entry, in batch order.
    fn resolve_values(&self, batch: &LogBatch) -> Vec<String> {
        let mut values = Vec::with_capacity(batch.entry_count() as usize);
        for group in &batch.groups {
            let resource = group.resource.as_ref();
            for scope_group in &group.scopes {
                let scope = scope_group.scope.as_ref();
                for entry in &scope_group.entries {
                    values.push(self.resolver.resolve_hierarchy(
                        resource,
                        scope,
                        entry.attributes.as_ref(),
                    ));
                }
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::AttributeSet;
    use crate::ingest::batch::{LogEntry, ResourceGroup, ScopeGroup};
    use crate::ingest::metrics::AtomicIngestMetrics;
    use crate::window::SimulatedClock;
    use std::time::Duration;

    fn orchestrator() -> (
        IngestOrchestrator<SimulatedClock>,
        Arc<WindowAggregator<SimulatedClock>>,
        Arc<AtomicIngestMetrics>,
    ) {
        let clock = SimulatedClock::new(0);
        let aggregator = Arc::new(WindowAggregator::with_clock(
            Duration::from_secs(10),
            false,
            clock,
        ));
        let metrics = Arc::new(AtomicIngestMetrics::new());
        let orchestrator = IngestOrchestrator::new(
            AttributeResolver::new("service.name"),
            aggregator.clone(),
            metrics.clone(),
        );
        (orchestrator, aggregator, metrics)
    }

    #[test]
    fn test_absent_batch_acknowledged_without_side_effects() {
        let (orchestrator, aggregator, metrics) = orchestrator();

        let ack = orchestrator.process(None);
        assert_eq!(ack, Acknowledgement::accept_all());
        assert_eq!(metrics.snapshot().requests_total, 0);
        assert!(aggregator.snapshot().is_empty());
    }

    #[test]
    fn test_empty_batch_counts_as_request() {
        let (orchestrator, aggregator, metrics) = orchestrator();

        let batch = LogBatch::new();
        orchestrator.process(Some(&batch));

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_total, 1);
        assert_eq!(snap.entries_processed_total, 0);
        assert!(aggregator.snapshot().is_empty());
    }

    #[test]
    fn test_entries_resolved_and_counted() {
        let (orchestrator, aggregator, metrics) = orchestrator();

        let batch = LogBatch::new().with_group(
            ResourceGroup::new(Some(AttributeSet::from_pairs(&[(
                "service.name",
                "checkout",
            )])))
            .with_scope(
                ScopeGroup::new(None)
                    .with_entry(LogEntry::new())
                    .with_entry(LogEntry::new()),
            ),
        );

        let ack = orchestrator.process(Some(&batch));
        assert!(ack.accepted_all);
        assert_eq!(aggregator.snapshot()["checkout"], 2);

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_total, 1);
        assert_eq!(snap.entries_processed_total, 2);
        assert_eq!(snap.attribute_values_total["checkout"], 2);
    }
}
