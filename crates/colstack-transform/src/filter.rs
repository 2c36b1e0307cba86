//! Row filters declared per column.

use std::collections::BTreeMap;

use colstack_binning::Comparison;
use colstack_model::{FilterOp, ScalarType, ScalarValue};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::frame::json_text;

/// Evaluates every filter of one column; a row passes only if all hold.
///
/// Null cells fail every filter except `__ne__`, which they always pass.
///
/// # Errors
///
/// Returns [`TransformError::FilterValue`] if a filter value cannot be parsed
/// with `scalar_type`.
pub fn filter_mask(
    column: &str,
    values: &[Option<ScalarValue>],
    scalar_type: ScalarType,
    filters: &BTreeMap<FilterOp, serde_json::Value>,
) -> Result<Vec<bool>> {
    let mut mask = vec![true; values.len()];

    for (&op, raw) in filters {
        let text = json_text(raw);
        let bound = scalar_type
            .parse(&text)
            .map_err(|_| TransformError::FilterValue {
                column: column.to_string(),
                op: op.tag(),
                value: text.clone(),
                scalar_type,
            })?;
        info!(column, filter = op.tag(), value = %bound, "Applying filter");

        for (keep, value) in mask.iter_mut().zip(values) {
            *keep &= value
                .as_ref()
                .map_or(op == FilterOp::Ne, |v| holds(op, v, &bound));
        }
    }

    Ok(mask)
}

/// Returns true if `value <op> bound`.
pub fn holds(op: FilterOp, value: &ScalarValue, bound: &ScalarValue) -> bool {
    match op {
        FilterOp::Lt => Comparison::LessThan.holds(value, bound),
        FilterOp::Le => Comparison::LessOrEqual.holds(value, bound),
        FilterOp::Gt => Comparison::GreaterThan.holds(value, bound),
        FilterOp::Ge => Comparison::GreaterOrEqual.holds(value, bound),
        FilterOp::Eq => Comparison::Equal.holds(value, bound),
        FilterOp::Ne => !Comparison::Equal.holds(value, bound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn countries() -> Vec<Option<ScalarValue>> {
        [Some("gb"), Some("fr"), None, Some("gb")]
            .into_iter()
            .map(|v| v.map(|t| ScalarValue::Text(t.to_string())))
            .collect()
    }

    #[test]
    fn test_eq_filter() {
        let filters = BTreeMap::from([(FilterOp::Eq, json!("gb"))]);
        let mask = filter_mask("country", &countries(), ScalarType::Category, &filters).unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
    }

    #[test]
    fn test_ne_keeps_nulls() {
        let filters = BTreeMap::from([(FilterOp::Ne, json!("gb"))]);
        let mask = filter_mask("country", &countries(), ScalarType::Category, &filters).unwrap();
        assert_eq!(mask, vec![false, true, true, false]);

        let values = vec![
            Some(ScalarValue::Text("gb".to_string())),
            None,
            Some(ScalarValue::Text("fr".to_string())),
        ];
        let mask = filter_mask("country", &values, ScalarType::Category, &filters).unwrap();
        assert_eq!(mask, vec![false, true, true]);
    }

    #[test]
    fn test_nulls_fail_other_filters() {
        for op in [FilterOp::Eq, FilterOp::Lt, FilterOp::Le, FilterOp::Gt, FilterOp::Ge] {
            let filters = BTreeMap::from([(op, json!("gb"))]);
            let mask = filter_mask("country", &[None], ScalarType::Category, &filters).unwrap();
            assert_eq!(mask, vec![false], "{}", op.tag());
        }
    }

    #[test]
    fn test_range_filters_combine() {
        let ages: Vec<_> = [10, 20, 30, 40]
            .into_iter()
            .map(|v| Some(ScalarValue::Int(v)))
            .collect();
        let filters = BTreeMap::from([(FilterOp::Ge, json!(20)), (FilterOp::Lt, json!("40"))]);
        let mask = filter_mask("age", &ages, ScalarType::Int, &filters).unwrap();
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn test_bad_filter_value() {
        let filters = BTreeMap::from([(FilterOp::Gt, json!("ten"))]);
        let err = filter_mask("age", &[], ScalarType::Int, &filters).unwrap_err();
        assert_eq!(
            err.to_string(),
            "filter __gt__ on column 'age': cannot use ten as int"
        );
    }
}
