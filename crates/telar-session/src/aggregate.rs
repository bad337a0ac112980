//! Value aggregation over a registry snapshot.
//!
//! The aggregator walks the snapshot in subscription order, pulls each
//! field's current value, re-validates it with a committing check, and
//! assembles the leaves into the session value. Per-field awaits run
//! strictly sequentially; there is no fan-out.

use serde_json::Value;
use std::sync::Arc;
use telar_contract::{CheckMode, FieldHandle};
use telar_state::{write, FieldPath};
use tracing::trace;

/// Outcome of a validated aggregation: the assembled value, or the ordered
/// list of invalid field paths. Never both.
#[derive(Clone, Debug, PartialEq)]
pub enum AggregationResult {
    /// Every field validated; the session value is fully assembled.
    Assembled(Value),
    /// At least one field failed its committing check; paths are in
    /// registry (subscription) order.
    Invalid(Vec<FieldPath>),
}

impl AggregationResult {
    /// Whether aggregation produced an assembled value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, AggregationResult::Assembled(_))
    }

    /// The assembled value, if validation passed.
    #[inline]
    pub fn into_value(self) -> Option<Value> {
        match self {
            AggregationResult::Assembled(value) => Some(value),
            AggregationResult::Invalid(_) => None,
        }
    }

    /// The invalid field paths; empty when validation passed.
    #[inline]
    pub fn invalid(&self) -> &[FieldPath] {
        match self {
            AggregationResult::Assembled(_) => &[],
            AggregationResult::Invalid(names) => names,
        }
    }
}

/// Pull, re-validate, and assemble every field in the snapshot.
///
/// Valid leaves are written into `value` even when other fields fail, so a
/// rejected submission still leaves the session value carrying everything
/// that did validate. A field whose value is absent writes an empty-string
/// leaf; a field without a validator counts as invalid.
pub async fn aggregate(
    fields: &[(FieldPath, Arc<dyn FieldHandle>)],
    value: &mut Value,
) -> AggregationResult {
    let mut invalid = Vec::new();

    for (path, handle) in fields {
        let current = handle.value().await;
        let valid = handle
            .check(current.clone(), CheckMode::Committing)
            .await
            .unwrap_or(false);

        if valid {
            let leaf = current.unwrap_or_else(|| Value::String(String::new()));
            write(path, value, leaf);
        } else {
            trace!(field = %path, "field failed committing check");
            invalid.push(path.clone());
        }
    }

    if invalid.is_empty() {
        AggregationResult::Assembled(value.clone())
    } else {
        AggregationResult::Invalid(invalid)
    }
}

/// Pull and assemble every field without validity gating.
///
/// Used for non-submitting snapshots (the diagnostic raw dump). Absent
/// values are written as `Null`; the walk always succeeds.
pub async fn collect_raw(
    fields: &[(FieldPath, Arc<dyn FieldHandle>)],
    value: &mut Value,
) -> Value {
    for (path, handle) in fields {
        let leaf = handle.value().await.unwrap_or(Value::Null);
        write(path, value, leaf);
    }
    value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telar_contract::testing::StubField;

    fn snapshot(fields: Vec<StubField>) -> Vec<(FieldPath, Arc<dyn FieldHandle>)> {
        fields
            .into_iter()
            .map(|f| {
                let path = FieldPath::parse(&f.name());
                (path, Arc::new(f) as Arc<dyn FieldHandle>)
            })
            .collect()
    }

    #[tokio::test]
    async fn assembles_nested_leaves() {
        let fields = snapshot(vec![
            StubField::new("address.city")
                .with_value(json!("X"))
                .always_valid(),
            StubField::new("address.zip")
                .with_value(json!("1"))
                .always_valid(),
        ]);

        let mut value = json!({});
        let result = aggregate(&fields, &mut value).await;

        assert_eq!(
            result,
            AggregationResult::Assembled(json!({"address": {"city": "X", "zip": "1"}}))
        );
    }

    #[tokio::test]
    async fn invalid_field_reported_and_leaf_not_written() {
        let fields = snapshot(vec![
            StubField::new("a").with_value(json!(1)).always_valid(),
            StubField::new("b")
                .with_value(json!(2))
                .with_validator(|_| false),
            StubField::new("c").with_value(json!(3)).always_valid(),
        ]);

        let mut value = json!({});
        let result = aggregate(&fields, &mut value).await;

        assert_eq!(result, AggregationResult::Invalid(vec![FieldPath::parse("b")]));
        // Valid leaves are written even on failure; B's leaf is not.
        assert_eq!(value, json!({"a": 1, "c": 3}));
    }

    #[tokio::test]
    async fn missing_validator_counts_as_invalid() {
        let fields = snapshot(vec![StubField::new("a").with_value(json!(1))]);

        let mut value = json!({});
        let result = aggregate(&fields, &mut value).await;
        assert_eq!(result, AggregationResult::Invalid(vec![FieldPath::parse("a")]));
    }

    #[tokio::test]
    async fn absent_value_defaults_to_empty_string() {
        let fields = snapshot(vec![StubField::new("a").always_valid()]);

        let mut value = json!({});
        let result = aggregate(&fields, &mut value).await;
        assert_eq!(result, AggregationResult::Assembled(json!({"a": ""})));
    }

    #[tokio::test]
    async fn invalid_order_follows_snapshot_order() {
        let fields = snapshot(vec![
            StubField::new("z").with_validator(|_| false),
            StubField::new("a").with_validator(|_| false),
        ]);

        let mut value = json!({});
        let result = aggregate(&fields, &mut value).await;
        assert_eq!(
            result.invalid(),
            &[FieldPath::parse("z"), FieldPath::parse("a")]
        );
    }

    #[tokio::test]
    async fn collect_raw_skips_validation() {
        let fields = snapshot(vec![
            StubField::new("bad").with_validator(|_| false).with_value(json!(7)),
            StubField::new("empty"),
        ]);

        let mut value = json!({});
        let raw = collect_raw(&fields, &mut value).await;
        assert_eq!(raw, json!({"bad": 7, "empty": null}));
    }
}
