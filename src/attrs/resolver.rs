//! Attribute resolution across the entry, scope and resource levels.
//!
//! A resolver is configured with a single attribute key at startup. For each
//! log entry it walks the hierarchy from most to least specific and returns
//! the first level that yields a real value; every miss, absent value or
//! unrenderable value collapses into the [`UNKNOWN_VALUE`] sentinel so the
//! counting layer only ever sees strings.

use super::value::{hex_lower, AttributeSet, AttributeValue};

/// Sentinel reported when no level of the hierarchy yields a value.
pub const UNKNOWN_VALUE: &str = "unknown";

/// Resolves one configured attribute key against attribute sets.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    attribute_key: String,
}

impl AttributeResolver {
    pub fn new(attribute_key: impl Into<String>) -> Self {
        AttributeResolver {
            attribute_key: attribute_key.into(),
        }
    }

    pub fn attribute_key(&self) -> &str {
        &self.attribute_key
    }

    /// Resolve against a single attribute set.
    ///
    /// Returns the rendered value of the first pair matching the configured
    /// key, or [`UNKNOWN_VALUE`] when the key is missing, its value is
    /// absent, or the value cannot be rendered.
    pub fn resolve(&self, attributes: &AttributeSet) -> String {
        attributes
            .get(&self.attribute_key)
            .and_then(|pair| pair.value.as_ref())
            .and_then(render_value)
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
    }

    /// Resolve across the hierarchy: entry first, then scope, then resource.
    ///
    /// A level that resolves to the sentinel does not shadow lower-priority
    /// levels; the first non-sentinel value wins. Absent levels are skipped.
    pub fn resolve_hierarchy(
        &self,
        resource: Option<&AttributeSet>,
        scope: Option<&AttributeSet>,
        entry: Option<&AttributeSet>,
    ) -> String {
        for attributes in [entry, scope, resource].into_iter().flatten() {
            let value = self.resolve(attributes);
            if value != UNKNOWN_VALUE {
                return value;
            }
        }
        UNKNOWN_VALUE.to_string()
    }
}

/// Render a value to its canonical string form.
///
/// Scalars format directly; lists and maps serialize to compact JSON.
/// Returns `None` only when JSON conversion fails, which the caller maps
/// to the sentinel.
fn render_value(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Str(s) => Some(s.clone()),
        AttributeValue::Int(i) => Some(i.to_string()),
        AttributeValue::Double(d) => Some(format!("{:.6}", d)),
        AttributeValue::Bool(b) => Some(b.to_string()),
        AttributeValue::Bytes(b) => Some(format!("base64:{}", hex_lower(b))),
        AttributeValue::List(_) | AttributeValue::Map(_) => value
            .to_json()
            .and_then(|json| serde_json::to_string(&json).ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AttributeResolver {
        AttributeResolver::new("service.name")
    }

    #[test]
    fn test_resolve_string_value() {
        let set = AttributeSet::from_pairs(&[("service.name", "checkout")]);
        assert_eq!(resolver().resolve(&set), "checkout");
    }

    #[test]
    fn test_resolve_missing_key_is_unknown() {
        let set = AttributeSet::from_pairs(&[("other.key", "x")]);
        assert_eq!(resolver().resolve(&set), UNKNOWN_VALUE);
        assert_eq!(resolver().resolve(&AttributeSet::new()), UNKNOWN_VALUE);
    }

    #[test]
    fn test_resolve_absent_value_is_unknown() {
        let set = AttributeSet::new().with_absent("service.name");
        assert_eq!(resolver().resolve(&set), UNKNOWN_VALUE);
    }

    #[test]
    fn test_resolve_int_decimal() {
        let set = AttributeSet::new().with("service.name", 200i64);
        assert_eq!(resolver().resolve(&set), "200");

        let negative = AttributeSet::new().with("service.name", -7i64);
        assert_eq!(resolver().resolve(&negative), "-7");
    }

    #[test]
    fn test_resolve_double_six_decimals() {
        let set = AttributeSet::new().with("service.name", 1.234f64);
        assert_eq!(resolver().resolve(&set), "1.234000");

        let whole = AttributeSet::new().with("service.name", 2.0f64);
        assert_eq!(resolver().resolve(&whole), "2.000000");
    }

    #[test]
    fn test_resolve_bool_lowercase() {
        let set = AttributeSet::new().with("service.name", true);
        assert_eq!(resolver().resolve(&set), "true");

        let falsy = AttributeSet::new().with("service.name", false);
        assert_eq!(resolver().resolve(&falsy), "false");
    }

    #[test]
    fn test_resolve_bytes_prefixed_hex() {
        let set = AttributeSet::new().with("service.name", vec![0x01u8, 0xab, 0xff]);
        assert_eq!(resolver().resolve(&set), "base64:01abff");
    }

    #[test]
    fn test_resolve_empty_list() {
        let set = AttributeSet::new().with("service.name", AttributeValue::List(vec![]));
        assert_eq!(resolver().resolve(&set), "[]");
    }

    #[test]
    fn test_resolve_list_compact_json() {
        let list = AttributeValue::List(vec![
            AttributeValue::from("a"),
            AttributeValue::Int(1),
            AttributeValue::Bool(false),
        ]);
        let set = AttributeSet::new().with("service.name", list);
        assert_eq!(resolver().resolve(&set), r#"["a",1,false]"#);
    }

    #[test]
    fn test_resolve_map_compact_json_sorted() {
        let map = AttributeValue::Map(vec![
            ("key1".to_string(), AttributeValue::from("value1")),
        ]);
        let set = AttributeSet::new().with("service.name", map);
        assert_eq!(resolver().resolve(&set), r#"{"key1":"value1"}"#);

        let unsorted = AttributeValue::Map(vec![
            ("b".to_string(), AttributeValue::Int(2)),
            ("a".to_string(), AttributeValue::Int(1)),
        ]);
        let set = AttributeSet::new().with("service.name", unsorted);
        assert_eq!(resolver().resolve(&set), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_resolve_unrenderable_value_is_unknown() {
        let list = AttributeValue::List(vec![AttributeValue::Double(f64::NAN)]);
        let set = AttributeSet::new().with("service.name", list);
        assert_eq!(resolver().resolve(&set), UNKNOWN_VALUE);
    }

    #[test]
    fn test_hierarchy_entry_wins() {
        let resource = AttributeSet::from_pairs(&[("service.name", "from-resource")]);
        let scope = AttributeSet::from_pairs(&[("service.name", "from-scope")]);
        let entry = AttributeSet::from_pairs(&[("service.name", "from-entry")]);

        let value = resolver().resolve_hierarchy(Some(&resource), Some(&scope), Some(&entry));
        assert_eq!(value, "from-entry");
    }

    #[test]
    fn test_hierarchy_scope_beats_resource() {
        let resource = AttributeSet::from_pairs(&[("service.name", "from-resource")]);
        let scope = AttributeSet::from_pairs(&[("service.name", "from-scope")]);

        let value = resolver().resolve_hierarchy(Some(&resource), Some(&scope), None);
        assert_eq!(value, "from-scope");
    }

    #[test]
    fn test_hierarchy_falls_back_to_resource() {
        let resource = AttributeSet::from_pairs(&[("service.name", "from-resource")]);
        let entry = AttributeSet::from_pairs(&[("unrelated", "x")]);

        let value = resolver().resolve_hierarchy(Some(&resource), None, Some(&entry));
        assert_eq!(value, "from-resource");
    }

    #[test]
    fn test_hierarchy_sentinel_does_not_shadow() {
        // Entry has the key with an absent value; the scope value must still
        // win over it.
        let scope = AttributeSet::from_pairs(&[("service.name", "from-scope")]);
        let entry = AttributeSet::new().with_absent("service.name");

        let value = resolver().resolve_hierarchy(None, Some(&scope), Some(&entry));
        assert_eq!(value, "from-scope");
    }

    #[test]
    fn test_hierarchy_all_levels_missing() {
        assert_eq!(resolver().resolve_hierarchy(None, None, None), UNKNOWN_VALUE);

        let empty = AttributeSet::new();
        let value = resolver().resolve_hierarchy(Some(&empty), Some(&empty), Some(&empty));
        assert_eq!(value, UNKNOWN_VALUE);
    }

    #[test]
    fn test_hierarchy_first_pair_wins_within_level() {
        let entry = AttributeSet::new()
            .with("service.name", "first")
            .with("service.name", "second");
        let value = resolver().resolve_hierarchy(None, None, Some(&entry));
        assert_eq!(value, "first");
    }
}
