//! Decoded log batch model.
//!
//! The transport decodes the wire format into this shape before handing it
//! to the orchestrator. The hierarchy is preserved exactly: entries nest
//! under a scope grouping, scope groupings under a resource grouping, and
//! any grouping may arrive without its attribute set.

use crate::attrs::{AttributeSet, AttributeValue};

/// One export request: resource groupings of log entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogBatch {
    pub groups: Vec<ResourceGroup>,
}

impl LogBatch {
    pub fn new() -> Self {
        LogBatch { groups: Vec::new() }
    }

    pub fn with_group(mut self, group: ResourceGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Total entries across every grouping.
    pub fn entry_count(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|group| group.scopes.iter())
            .map(|scope| scope.entries.len() as u64)
            .sum()
    }
}

/// Entries that share one resource-level attribute set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGroup {
    pub resource: Option<AttributeSet>,
    pub scopes: Vec<ScopeGroup>,
}

impl ResourceGroup {
    pub fn new(resource: Option<AttributeSet>) -> Self {
        ResourceGroup {
            resource,
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeGroup) -> Self {
        self.scopes.push(scope);
        self
    }
}

/// Entries that share one scope-level attribute set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeGroup {
    pub scope: Option<AttributeSet>,
    pub entries: Vec<LogEntry>,
}

impl ScopeGroup {
    pub fn new(scope: Option<AttributeSet>) -> Self {
        ScopeGroup {
            scope,
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: LogEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// A single log entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEntry {
    pub time_unix_nano: u64,
    pub severity_text: Option<String>,
    pub body: Option<AttributeValue>,
    pub attributes: Option<AttributeSet>,
}

impl LogEntry {
    pub fn new() -> Self {
        LogEntry::default()
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_body(mut self, body: impl Into<AttributeValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity_text = Some(severity.into());
        self
    }

    pub fn with_timestamp(mut self, time_unix_nano: u64) -> Self {
        self.time_unix_nano = time_unix_nano;
        self
    }
}
