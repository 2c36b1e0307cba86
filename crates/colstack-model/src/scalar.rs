//! Scalar types and values.
//!
//! A column carries a single declared [`ScalarType`]; each cell is an
//! `Option<ScalarValue>` where `None` is a missing value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::registry::registry;

/// Milliseconds in one day, the unit for `delta` text values.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Declared type of a column.
///
/// Serialized as the short dtype tag used in configuration documents
/// (`int`, `float`, `date`, `delta`, `str`, `bool`, `cat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScalarType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Timestamp without timezone.
    Date,
    /// Duration; text is read as a number of days.
    Delta,
    /// Free text.
    Str,
    /// Boolean flag.
    Bool,
    /// Categorical text (compared by exact equality only).
    Category,
}

impl ScalarType {
    /// All scalar types in registry order.
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::Date,
        ScalarType::Delta,
        ScalarType::Str,
        ScalarType::Bool,
        ScalarType::Category,
    ];

    /// The configuration tag for this type.
    pub fn tag(self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Date => "date",
            ScalarType::Delta => "delta",
            ScalarType::Str => "str",
            ScalarType::Bool => "bool",
            ScalarType::Category => "cat",
        }
    }

    /// Parses text into a value of this type using the registered parse function.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownScalarType`] if the type has no registry
    /// entry, or [`ModelError::ValueParse`] if the text is not a valid value.
    pub fn parse(self, text: &str) -> Result<ScalarValue> {
        let info = registry()
            .get(self)
            .ok_or_else(|| registry().unknown(self.tag()))?;
        (info.parse)(text).ok_or_else(|| ModelError::ValueParse {
            text: text.to_string(),
            scalar_type: self,
        })
    }

    /// Domain minimum and maximum sentinels, if the type is orderable.
    pub fn bounds(self) -> Option<(ScalarValue, ScalarValue)> {
        registry().get(self).and_then(|info| info.bounds.clone())
    }

    /// Returns true if values of this type may appear as interval bounds.
    pub fn is_orderable(self) -> bool {
        self.bounds().is_some()
    }

    /// Returns true if `value` is stored in this type's native representation.
    pub fn accepts(self, value: &ScalarValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::Int, ScalarValue::Int(_))
                | (ScalarType::Float, ScalarValue::Float(_))
                | (ScalarType::Date, ScalarValue::Date(_))
                | (ScalarType::Delta, ScalarValue::Delta(_))
                | (ScalarType::Bool, ScalarValue::Bool(_))
                | (ScalarType::Str | ScalarType::Category, ScalarValue::Text(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ScalarType {
    type Err = ModelError;

    fn from_str(tag: &str) -> Result<Self> {
        registry().lookup(tag).map(|info| info.scalar_type)
    }
}

impl TryFrom<String> for ScalarType {
    type Error = ModelError;

    fn try_from(tag: String) -> Result<Self> {
        tag.parse()
    }
}

impl From<ScalarType> for String {
    fn from(scalar_type: ScalarType) -> Self {
        scalar_type.tag().to_string()
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Date(NaiveDateTime),
    Delta(TimeDelta),
    Bool(bool),
    /// Text for both `str` and `cat` columns.
    Text(String),
}

impl ScalarValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(v) => Some(*v),
            ScalarValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ScalarValue::Date(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_delta(&self) -> Option<TimeDelta> {
        match self {
            ScalarValue::Delta(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the value to `target`, re-parsing its text form when the
    /// native representation differs.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ValueParse`] if the text form is not valid for `target`.
    pub fn coerce(&self, target: ScalarType) -> Result<ScalarValue> {
        if target.accepts(self) {
            return Ok(self.clone());
        }
        target.parse(&self.to_string())
    }
}

impl PartialOrd for ScalarValue {
    /// Values of different variants are unordered; float `NaN` is unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a.partial_cmp(b),
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.partial_cmp(b),
            (ScalarValue::Date(a), ScalarValue::Date(b)) => a.partial_cmp(b),
            (ScalarValue::Delta(a), ScalarValue::Delta(b)) => a.partial_cmp(b),
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a.partial_cmp(b),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => f.write_str(&format_numeric(*v)),
            ScalarValue::Date(v) => {
                if v.time().num_seconds_from_midnight() == 0 && v.time().nanosecond() == 0 {
                    write!(f, "{}", v.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            ScalarValue::Delta(v) => {
                f.write_str(&format_numeric(v.num_milliseconds() as f64 / MILLIS_PER_DAY))
            }
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Text(v) => f.write_str(v),
        }
    }
}

/// Formats a floating-point number without trailing zeros after the decimal point.
///
/// # Examples
///
/// ```
/// use colstack_model::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(40.0), "40");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}
