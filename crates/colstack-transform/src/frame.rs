//! Conversion between frame columns and typed cell values.
//!
//! Storage per scalar type:
//!
//! | Type | Storage |
//! |------|---------|
//! | `int` | `Int64` |
//! | `float` | `Float64` |
//! | `bool` | `Boolean` |
//! | `str`, `cat` | `String` |
//! | `date` | `Datetime(ms)` |
//! | `delta` | `Duration(ms)` |
//!
//! Empty or whitespace-only text and float `NaN` read as null.

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use colstack_model::{ScalarType, ScalarValue};
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// A column's cells together with the scalar type they carry.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    pub scalar_type: ScalarType,
    pub values: Vec<Option<ScalarValue>>,
}

impl TypedColumn {
    pub fn new(scalar_type: ScalarType, values: Vec<Option<ScalarValue>>) -> Self {
        Self {
            scalar_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts every cell to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Coerce`] naming the first cell that fails.
    pub fn coerce(self, column: &str, target: ScalarType) -> Result<Self> {
        if self.scalar_type == target {
            return Ok(self);
        }
        let values = coerce_values(column, self.values, target)?;
        Ok(Self::new(target, values))
    }
}

/// Scalar type implied by a column's storage type.
pub fn storage_scalar_type(column: &Column) -> Result<ScalarType> {
    match column.dtype() {
        DataType::String | DataType::Null => Ok(ScalarType::Str),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => Ok(ScalarType::Int),
        DataType::Float32 | DataType::Float64 => Ok(ScalarType::Float),
        DataType::Boolean => Ok(ScalarType::Bool),
        DataType::Date | DataType::Datetime(_, _) => Ok(ScalarType::Date),
        DataType::Duration(_) => Ok(ScalarType::Delta),
        other => Err(TransformError::UnsupportedStorage {
            column: column.name().to_string(),
            dtype: other.to_string(),
        }),
    }
}

/// Reads a frame column as `scalar_type` values, parsing text cells through
/// the type registry.
///
/// # Errors
///
/// - [`TransformError::ColumnNotFound`] if `name` is not in `df`
/// - [`TransformError::Coerce`] if a cell cannot be converted
pub fn read_column(df: &DataFrame, name: &str, scalar_type: ScalarType) -> Result<TypedColumn> {
    let column = df
        .column(name)
        .map_err(|_| TransformError::ColumnNotFound {
            column: name.to_string(),
        })?;
    let values = read_values(column, scalar_type)?;
    Ok(TypedColumn::new(scalar_type, values))
}

/// Reads a frame column in the scalar type implied by its storage.
pub fn read_column_native(df: &DataFrame, name: &str) -> Result<TypedColumn> {
    let column = df
        .column(name)
        .map_err(|_| TransformError::ColumnNotFound {
            column: name.to_string(),
        })?;
    let scalar_type = storage_scalar_type(column)?;
    let values = read_values(column, scalar_type)?;
    Ok(TypedColumn::new(scalar_type, values))
}

/// Reads every cell of `column` as a `scalar_type` value.
pub fn read_values(column: &Column, scalar_type: ScalarType) -> Result<Vec<Option<ScalarValue>>> {
    let name = column.name().as_str();
    let mut values = Vec::with_capacity(column.len());

    for row in 0..column.len() {
        let value = match native_value(column.get(row)?, name, row)? {
            None => None,
            Some(ScalarValue::Text(text)) if text.trim().is_empty() => None,
            Some(value) => Some(coerce_value(name, row, &value, scalar_type)?),
        };
        values.push(value);
    }

    Ok(values)
}

/// Reads every cell of `column` as display text; null stays `None`.
pub fn text_values(column: &Column) -> Result<Vec<Option<String>>> {
    let name = column.name().as_str();
    let mut values = Vec::with_capacity(column.len());
    for row in 0..column.len() {
        let value = native_value(column.get(row)?, name, row)?;
        values.push(value.as_ref().map(ToString::to_string));
    }
    Ok(values)
}

/// Builds a frame column of `scalar_type` storage from typed values.
///
/// # Errors
///
/// Returns [`TransformError::Coerce`] if a value cannot be converted to
/// `scalar_type`.
pub fn write_column(name: &str, column: &TypedColumn) -> Result<Column> {
    let values = coerce_values(name, column.values.clone(), column.scalar_type)?;

    let series = match column.scalar_type {
        ScalarType::Int => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| v.as_ref().and_then(ScalarValue::as_i64))
                .collect::<Vec<_>>(),
        ),
        ScalarType::Float => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| v.as_ref().and_then(ScalarValue::as_f64))
                .collect::<Vec<_>>(),
        ),
        ScalarType::Bool => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| v.as_ref().and_then(ScalarValue::as_bool))
                .collect::<Vec<_>>(),
        ),
        ScalarType::Str | ScalarType::Category => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| v.as_ref().map(ToString::to_string))
                .collect::<Vec<Option<String>>>(),
        ),
        ScalarType::Date => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| {
                    v.as_ref()
                        .and_then(ScalarValue::as_datetime)
                        .map(|dt| dt.and_utc().timestamp_millis())
                })
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        ScalarType::Delta => Series::new(
            name.into(),
            values
                .iter()
                .map(|v| {
                    v.as_ref()
                        .and_then(ScalarValue::as_delta)
                        .map(|d| d.num_milliseconds())
                })
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Duration(TimeUnit::Milliseconds))?,
    };

    Ok(series.into_column())
}

/// Builds a text column; used for materialized bin labels.
pub fn write_text_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Text form of a JSON configuration value; strings are used verbatim.
pub fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_values(
    column: &str,
    values: Vec<Option<ScalarValue>>,
    target: ScalarType,
) -> Result<Vec<Option<ScalarValue>>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(value) if !target.accepts(&value) => {
                coerce_value(column, row, &value, target).map(Some)
            }
            other => Ok(other),
        })
        .collect()
}

fn coerce_value(
    column: &str,
    row: usize,
    value: &ScalarValue,
    target: ScalarType,
) -> Result<ScalarValue> {
    value.coerce(target).map_err(|_| TransformError::Coerce {
        column: column.to_string(),
        row,
        text: value.to_string(),
        scalar_type: target,
    })
}

fn native_value(value: AnyValue<'_>, column: &str, row: usize) -> Result<Option<ScalarValue>> {
    let out_of_range = |raw: i64, scalar_type: ScalarType| TransformError::Coerce {
        column: column.to_string(),
        row,
        text: raw.to_string(),
        scalar_type,
    };

    let value = match value {
        AnyValue::Null => None,
        AnyValue::Boolean(v) => Some(ScalarValue::Bool(v)),
        AnyValue::String(v) => Some(ScalarValue::Text(v.to_string())),
        AnyValue::StringOwned(v) => Some(ScalarValue::Text(v.to_string())),
        AnyValue::Int8(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::Int16(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::Int32(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::Int64(v) => Some(ScalarValue::Int(v)),
        AnyValue::UInt8(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::UInt16(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::UInt32(v) => Some(ScalarValue::Int(i64::from(v))),
        AnyValue::Float32(v) => Some(f64::from(v)).filter(|v| !v.is_nan()).map(ScalarValue::Float),
        AnyValue::Float64(v) => Some(v).filter(|v| !v.is_nan()).map(ScalarValue::Float),
        AnyValue::Date(days) => Some(ScalarValue::Date(
            millis_to_datetime(i64::from(days) * MILLIS_PER_DAY)
                .ok_or_else(|| out_of_range(i64::from(days), ScalarType::Date))?,
        )),
        AnyValue::Datetime(raw, unit, _) => {
            let millis = to_millis(raw, unit);
            Some(ScalarValue::Date(
                millis_to_datetime(millis).ok_or_else(|| out_of_range(raw, ScalarType::Date))?,
            ))
        }
        AnyValue::Duration(raw, unit) => Some(ScalarValue::Delta(
            TimeDelta::try_milliseconds(to_millis(raw, unit))
                .ok_or_else(|| out_of_range(raw, ScalarType::Delta))?,
        )),
        other => {
            return Err(TransformError::UnsupportedStorage {
                column: column.to_string(),
                dtype: other.dtype().to_string(),
            });
        }
    };
    Ok(value)
}

const MILLIS_PER_DAY: i64 = 86_400_000;

fn to_millis(raw: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => raw.div_euclid(1_000_000),
        TimeUnit::Microseconds => raw.div_euclid(1_000),
        TimeUnit::Milliseconds => raw,
    }
}

fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}
