//! Static registry mapping dtype tags to parse functions and domain bounds.
//!
//! The registry is built once on first access and is read-only afterwards.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{ModelError, Result};
use crate::scalar::{MILLIS_PER_DAY, ScalarType, ScalarValue};

/// Parses trimmed or raw text into a typed value, `None` on failure.
pub type ParseFn = fn(&str) -> Option<ScalarValue>;

/// Registry entry for one scalar type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub scalar_type: ScalarType,
    pub tag: &'static str,
    pub parse: ParseFn,
    /// `(min, max)` sentinels for implicit interval bounds. `None` for types
    /// that can only be matched by enumeration.
    pub bounds: Option<(ScalarValue, ScalarValue)>,
}

/// Immutable lookup table of registered scalar types.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: Vec<TypeInfo>,
}

static REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::builtin);

/// Returns the process-wide type registry.
pub fn registry() -> &'static TypeRegistry {
    &REGISTRY
}

impl TypeRegistry {
    fn builtin() -> Self {
        let entries = ScalarType::ALL
            .into_iter()
            .map(|scalar_type| {
                let (parse, bounds): (ParseFn, _) = match scalar_type {
                    ScalarType::Int => (
                        parse_int,
                        Some((ScalarValue::Int(i64::MIN), ScalarValue::Int(i64::MAX))),
                    ),
                    ScalarType::Float => (
                        parse_float,
                        Some((
                            ScalarValue::Float(f64::NEG_INFINITY),
                            ScalarValue::Float(f64::INFINITY),
                        )),
                    ),
                    ScalarType::Date => (
                        parse_date,
                        Some((
                            ScalarValue::Date(NaiveDateTime::MIN),
                            ScalarValue::Date(NaiveDateTime::MAX),
                        )),
                    ),
                    ScalarType::Delta => (parse_delta, None),
                    ScalarType::Bool => (parse_bool, None),
                    ScalarType::Str | ScalarType::Category => (parse_text, None),
                };
                TypeInfo {
                    scalar_type,
                    tag: scalar_type.tag(),
                    parse,
                    bounds,
                }
            })
            .collect();
        Self { entries }
    }

    /// Looks up a type by its configuration tag.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownScalarType`] for unregistered tags.
    pub fn lookup(&self, tag: &str) -> Result<&TypeInfo> {
        let tag = tag.trim();
        self.entries
            .iter()
            .find(|info| info.tag == tag)
            .ok_or_else(|| self.unknown(tag))
    }

    pub fn get(&self, scalar_type: ScalarType) -> Option<&TypeInfo> {
        self.entries
            .iter()
            .find(|info| info.scalar_type == scalar_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.entries.iter()
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().map(|info| info.tag).collect()
    }

    pub(crate) fn unknown(&self, tag: &str) -> ModelError {
        ModelError::UnknownScalarType {
            tag: tag.to_string(),
            known: self.tags().join(", "),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_int(text: &str) -> Option<ScalarValue> {
    text.trim().parse::<i64>().ok().map(ScalarValue::Int)
}

fn parse_float(text: &str) -> Option<ScalarValue> {
    text.trim().parse::<f64>().ok().map(ScalarValue::Float)
}

fn parse_date(text: &str) -> Option<ScalarValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })
        .map(ScalarValue::Date)
}

fn parse_delta(text: &str) -> Option<ScalarValue> {
    let days = text.trim().parse::<f64>().ok()?;
    if !days.is_finite() {
        return None;
    }
    let millis = (days * MILLIS_PER_DAY).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).map(ScalarValue::Delta)
}

fn parse_bool(text: &str) -> Option<ScalarValue> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(ScalarValue::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Some(ScalarValue::Bool(false)),
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<ScalarValue> {
    Some(ScalarValue::Text(text.to_string()))
}
