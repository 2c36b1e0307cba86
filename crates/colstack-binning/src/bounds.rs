//! Domain sentinels for unbounded interval endpoints.

use colstack_model::{ScalarType, ScalarValue};

use crate::error::{BinError, Result};

/// Returns `(min_sentinel, max_sentinel)` for an orderable scalar type.
///
/// Integers resolve to `i64::MIN`/`i64::MAX`, floats to `-inf`/`+inf` and
/// dates to the minimum/maximum representable timestamp.
///
/// # Errors
///
/// Returns [`BinError::UnsupportedBoundType`] for types that can only be
/// binned by enumeration (`str`, `cat`, `bool`, `delta`).
pub fn resolve_bounds(scalar_type: ScalarType) -> Result<(ScalarValue, ScalarValue)> {
    scalar_type
        .bounds()
        .ok_or(BinError::UnsupportedBoundType { scalar_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_numeric_sentinels() {
        assert_eq!(
            resolve_bounds(ScalarType::Int).unwrap(),
            (ScalarValue::Int(i64::MIN), ScalarValue::Int(i64::MAX))
        );
        let (min, max) = resolve_bounds(ScalarType::Float).unwrap();
        assert_eq!(min, ScalarValue::Float(f64::NEG_INFINITY));
        assert_eq!(max, ScalarValue::Float(f64::INFINITY));
    }

    #[test]
    fn test_date_sentinels() {
        let (min, max) = resolve_bounds(ScalarType::Date).unwrap();
        assert_eq!(min, ScalarValue::Date(NaiveDateTime::MIN));
        assert_eq!(max, ScalarValue::Date(NaiveDateTime::MAX));
    }

    #[test]
    fn test_unsupported_types() {
        for scalar_type in [
            ScalarType::Str,
            ScalarType::Category,
            ScalarType::Bool,
            ScalarType::Delta,
        ] {
            assert!(matches!(
                resolve_bounds(scalar_type),
                Err(BinError::UnsupportedBoundType { .. })
            ));
        }
    }
}
