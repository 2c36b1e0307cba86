//! Predicate evaluation over a column.

use std::cmp::Ordering;

use colstack_model::{ScalarType, ScalarValue};

use crate::bounds::resolve_bounds;
use crate::error::Result;
use crate::expr::{BinExpression, Endpoint};

/// Comparison applied between a cell value and a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    GreaterThan,
    LessOrEqual,
    LessThan,
    Equal,
}

impl Comparison {
    /// Comparison implied by a lower endpoint: `[` is `>=`, `(` is `>`.
    pub fn for_lower(endpoint: &Endpoint) -> Self {
        if endpoint.inclusive {
            Comparison::GreaterOrEqual
        } else {
            Comparison::GreaterThan
        }
    }

    /// Comparison implied by an upper endpoint: `]` is `<=`, `)` is `<`.
    pub fn for_upper(endpoint: &Endpoint) -> Self {
        if endpoint.inclusive {
            Comparison::LessOrEqual
        } else {
            Comparison::LessThan
        }
    }

    /// Returns true if `value <op> bound` holds. Unordered pairs never match.
    pub fn holds(self, value: &ScalarValue, bound: &ScalarValue) -> bool {
        if self == Comparison::Equal {
            return value == bound;
        }
        match value.partial_cmp(bound) {
            Some(Ordering::Greater) => matches!(
                self,
                Comparison::GreaterOrEqual | Comparison::GreaterThan
            ),
            Some(Ordering::Equal) => {
                matches!(self, Comparison::GreaterOrEqual | Comparison::LessOrEqual)
            }
            Some(Ordering::Less) => matches!(self, Comparison::LessOrEqual | Comparison::LessThan),
            None => false,
        }
    }
}

/// A bin expression with its bounds resolved, ready to test values.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Interval {
        lower: (Comparison, ScalarValue),
        upper: (Comparison, ScalarValue),
    },
    Enumeration(Vec<ScalarValue>),
}

impl Predicate {
    /// Resolves unbounded endpoints to the type's sentinels.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BinError::UnsupportedBoundType`] if an interval is
    /// compiled for a type without sentinels.
    pub fn compile(expression: &BinExpression, scalar_type: ScalarType) -> Result<Self> {
        match expression {
            BinExpression::Interval { lower, upper } => {
                let (min, max) = resolve_bounds(scalar_type)?;
                Ok(Predicate::Interval {
                    lower: (
                        Comparison::for_lower(lower),
                        lower.value.clone().unwrap_or(min),
                    ),
                    upper: (
                        Comparison::for_upper(upper),
                        upper.value.clone().unwrap_or(max),
                    ),
                })
            }
            BinExpression::Enumeration { members } => Ok(Predicate::Enumeration(members.clone())),
        }
    }

    pub fn matches(&self, value: &ScalarValue) -> bool {
        match self {
            Predicate::Interval { lower, upper } => {
                lower.0.holds(value, &lower.1) && upper.0.holds(value, &upper.1)
            }
            Predicate::Enumeration(members) => members
                .iter()
                .any(|member| Comparison::Equal.holds(value, member)),
        }
    }

    /// Membership mask over the column; null cells are never claimed.
    pub fn mask(&self, values: &[Option<ScalarValue>]) -> Vec<bool> {
        values
            .iter()
            .map(|value| value.as_ref().is_some_and(|v| self.matches(v)))
            .collect()
    }
}

/// Evaluates `expression` against a column, producing a membership mask.
///
/// # Errors
///
/// Returns [`crate::BinError::UnsupportedBoundType`] for intervals over
/// non-orderable types.
pub fn evaluate(
    expression: &BinExpression,
    scalar_type: ScalarType,
    values: &[Option<ScalarValue>],
) -> Result<Vec<bool>> {
    Ok(Predicate::compile(expression, scalar_type)?.mask(values))
}

/// Null mask of a column, independent of its type.
pub fn null_mask(values: &[Option<ScalarValue>]) -> Vec<bool> {
    values.iter().map(Option::is_none).collect()
}
