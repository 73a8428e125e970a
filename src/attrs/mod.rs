//! Attribute data model and hierarchical resolution.

mod resolver;
mod value;

pub use resolver::{AttributeResolver, UNKNOWN_VALUE};
pub use value::{AttributeSet, AttributeValue, KeyValue};
