//! Bin expression parsing.
//!
//! Two forms are accepted:
//!
//! - **Interval** `[a..b]`, `(a..b)`, `[..b]`, `(a..]`: brackets select the
//!   inclusivity of each side, an empty side is unbounded. An interval that
//!   admits no value, such as `[10..2]` or `(5..5)`, is valid and claims no rows.
//! - **Enumeration** `[a,b,c]`: exact-match membership.

use std::fmt;

use colstack_model::{ScalarType, ScalarValue};

use crate::error::{BinError, Result};

/// Separator between interval endpoints.
pub const INTERVAL_SEP: &str = "..";
/// Separator between enumeration members.
pub const LIST_SEP: char = ',';

/// One side of an interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// `None` means unbounded on this side.
    pub value: Option<ScalarValue>,
    pub inclusive: bool,
}

impl Endpoint {
    pub fn inclusive(value: ScalarValue) -> Self {
        Self {
            value: Some(value),
            inclusive: true,
        }
    }

    pub fn exclusive(value: ScalarValue) -> Self {
        Self {
            value: Some(value),
            inclusive: false,
        }
    }

    pub fn unbounded(inclusive: bool) -> Self {
        Self {
            value: None,
            inclusive,
        }
    }
}

/// Structured predicate of a single bin.
#[derive(Debug, Clone, PartialEq)]
pub enum BinExpression {
    Interval { lower: Endpoint, upper: Endpoint },
    Enumeration { members: Vec<ScalarValue> },
}

impl BinExpression {
    /// Parses `text` for a column of `scalar_type`.
    ///
    /// # Errors
    ///
    /// - [`BinError::BinExpressionParse`] for malformed brackets/separators or
    ///   values rejected by the type's parser
    /// - [`BinError::UnsupportedBoundType`] for an interval on a type without
    ///   domain sentinels
    pub fn parse(text: &str, scalar_type: ScalarType) -> Result<Self> {
        let text = text.trim();
        if text.contains(INTERVAL_SEP) {
            parse_interval(text, scalar_type)
        } else {
            parse_enumeration(text, scalar_type)
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, BinExpression::Interval { .. })
    }
}

impl fmt::Display for BinExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinExpression::Interval { lower, upper } => {
                f.write_str(if lower.inclusive { "[" } else { "(" })?;
                if let Some(value) = &lower.value {
                    write!(f, "{value}")?;
                }
                f.write_str(INTERVAL_SEP)?;
                if let Some(value) = &upper.value {
                    write!(f, "{value}")?;
                }
                f.write_str(if upper.inclusive { "]" } else { ")" })
            }
            BinExpression::Enumeration { members } => {
                f.write_str("[")?;
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "{LIST_SEP}")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Splits off the first and last characters, which must be brackets.
fn strip_brackets(text: &str) -> Option<(char, &str, char)> {
    let mut chars = text.chars();
    let open = chars.next()?;
    let close = chars.next_back()?;
    Some((open, chars.as_str(), close))
}

fn parse_interval(text: &str, scalar_type: ScalarType) -> Result<BinExpression> {
    let (open, inner, close) = strip_brackets(text)
        .ok_or_else(|| BinError::parse(text, scalar_type, "interval is too short"))?;

    let lower_inclusive = match open {
        '[' => true,
        '(' => false,
        _ => {
            return Err(BinError::parse(
                text,
                scalar_type,
                "interval must start with '[' or '('",
            ));
        }
    };
    let upper_inclusive = match close {
        ']' => true,
        ')' => false,
        _ => {
            return Err(BinError::parse(
                text,
                scalar_type,
                "interval must end with ']' or ')'",
            ));
        }
    };

    let Some((left, right)) = inner.split_once(INTERVAL_SEP) else {
        return Err(BinError::parse(text, scalar_type, "missing '..' separator"));
    };
    if right.contains(INTERVAL_SEP) {
        return Err(BinError::parse(
            text,
            scalar_type,
            "more than one '..' separator",
        ));
    }

    if !scalar_type.is_orderable() {
        return Err(BinError::UnsupportedBoundType { scalar_type });
    }

    let lower = parse_bound(left, scalar_type)?;
    let upper = parse_bound(right, scalar_type)?;

    Ok(BinExpression::Interval {
        lower: Endpoint {
            value: lower,
            inclusive: lower_inclusive,
        },
        upper: Endpoint {
            value: upper,
            inclusive: upper_inclusive,
        },
    })
}

fn parse_bound(text: &str, scalar_type: ScalarType) -> Result<Option<ScalarValue>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_value(trimmed, scalar_type).map(Some)
}

fn parse_enumeration(text: &str, scalar_type: ScalarType) -> Result<BinExpression> {
    let Some(('[', inner, ']')) = strip_brackets(text) else {
        return Err(BinError::parse(
            text,
            scalar_type,
            "enumeration must be enclosed in '[' and ']'",
        ));
    };

    if inner.trim().is_empty() {
        return Err(BinError::parse(text, scalar_type, "enumeration is empty"));
    }

    let members = inner
        .split(LIST_SEP)
        .map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() {
                Err(BinError::parse(text, scalar_type, "empty enumeration member"))
            } else {
                parse_value(piece, scalar_type)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BinExpression::Enumeration { members })
}

fn parse_value(text: &str, scalar_type: ScalarType) -> Result<ScalarValue> {
    scalar_type
        .parse(text)
        .map_err(|err| BinError::from_value_parse(err, text, scalar_type))
}
