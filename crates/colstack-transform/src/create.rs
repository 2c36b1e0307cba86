//! Column creation functions.
//!
//! Each function takes its argument columns already typed and returns a new
//! column in the function's natural output type.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use colstack_binning::group_labels;
use colstack_model::{CreateFunc, ScalarType, ScalarValue};

use crate::error::{Result, TransformError};
use crate::frame::{TypedColumn, json_text};

/// Days per year used for fractional ages.
pub const DAYS_PER_YEAR: f64 = 365.25;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Builds column `column` with `func`.
///
/// # Errors
///
/// - [`TransformError::CreateArity`] for the wrong number of argument columns
/// - [`TransformError::ArgumentType`] for date functions given non-date columns
/// - [`TransformError::MissingKwarg`] when `col_for_lot` has no `keep_key`
pub fn create_column(
    column: &str,
    func: CreateFunc,
    args: &[TypedColumn],
    kwargs: &BTreeMap<String, serde_json::Value>,
) -> Result<TypedColumn> {
    if args.len() != func.arity() {
        return Err(TransformError::CreateArity {
            column: column.to_string(),
            func: func.name(),
            expected: func.arity(),
            found: args.len(),
        });
    }

    match func {
        CreateFunc::Id | CreateFunc::CopyCol => Ok(args[0].clone()),
        CreateFunc::GetAgeFloat => {
            let dates = date_pairs(column, func, &args[0], &args[1])?;
            let values = dates
                .map(|pair| {
                    pair.map(|(date, dob)| {
                        ScalarValue::Float(floor_days(date, dob) as f64 / DAYS_PER_YEAR)
                    })
                })
                .collect();
            Ok(TypedColumn::new(ScalarType::Float, values))
        }
        CreateFunc::GetAgeDelta => {
            let dates = date_pairs(column, func, &args[0], &args[1])?;
            let values = dates
                .map(|pair| {
                    pair.map(|(date, dob)| ScalarValue::Delta(date.signed_duration_since(dob)))
                })
                .collect();
            Ok(TypedColumn::new(ScalarType::Delta, values))
        }
        CreateFunc::NextLotDate => {
            expect_type(column, func, &args[1], ScalarType::Date)?;
            Ok(next_lot_date(&args[0], &args[1], &args[2]))
        }
        CreateFunc::ColForLot => {
            let keep_key = kwargs
                .get("keep_key")
                .ok_or(TransformError::MissingKwarg {
                    func: func.name(),
                    name: "keep_key",
                })?;
            let keep_key = args[0]
                .scalar_type
                .parse(&json_text(keep_key))
                .map_err(|err| TransformError::InvalidKwarg {
                    func: func.name(),
                    name: "keep_key",
                    reason: err.to_string(),
                })?;
            Ok(col_for_lot(&args[0], &args[1], &args[2], &keep_key))
        }
    }
}

/// For each patient, the date of the next line of therapy by lot order.
///
/// Rows are grouped by `patient_id` and ordered by `lots` (nulls last, ties
/// in row order). Each row gets the date of the following row in its group;
/// the last row of a group, and rows without a patient id, get null.
pub fn next_lot_date(
    lots: &TypedColumn,
    dates: &TypedColumn,
    patient_id: &TypedColumn,
) -> TypedColumn {
    let mut out: Vec<Option<ScalarValue>> = vec![None; patient_id.len()];

    for (_, mut rows) in group_labels(&group_keys(patient_id), None) {
        rows.sort_by(|&a, &b| compare_nullable(&lots.values[a], &lots.values[b]));
        for pair in rows.windows(2) {
            out[pair[0]] = dates.values[pair[1]].clone();
        }
    }

    TypedColumn::new(ScalarType::Date, out)
}

/// Broadcasts, per group of `idx`, the value of `vals` on the row whose key
/// equals `keep_key`. When several rows match, the last one wins; groups
/// without a match stay null.
pub fn col_for_lot(
    keys: &TypedColumn,
    vals: &TypedColumn,
    idx: &TypedColumn,
    keep_key: &ScalarValue,
) -> TypedColumn {
    let mut out: Vec<Option<ScalarValue>> = vec![None; idx.len()];

    for (_, rows) in group_labels(&group_keys(idx), None) {
        let chosen = rows
            .iter()
            .rev()
            .find(|&&row| keys.values[row].as_ref() == Some(keep_key))
            .map(|&row| vals.values[row].clone());
        if let Some(value) = chosen {
            for &row in &rows {
                out[row] = value.clone();
            }
        }
    }

    TypedColumn::new(vals.scalar_type, out)
}

fn group_keys(column: &TypedColumn) -> Vec<Option<String>> {
    column
        .values
        .iter()
        .map(|v| v.as_ref().map(ToString::to_string))
        .collect()
}

fn compare_nullable(a: &Option<ScalarValue>, b: &Option<ScalarValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Whole days between two timestamps, rounded toward negative infinity.
fn floor_days(date: NaiveDateTime, dob: NaiveDateTime) -> i64 {
    date.signed_duration_since(dob)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

fn expect_type(
    column: &str,
    func: CreateFunc,
    arg: &TypedColumn,
    expected: ScalarType,
) -> Result<()> {
    if arg.scalar_type != expected {
        return Err(TransformError::ArgumentType {
            column: column.to_string(),
            func: func.name(),
            expected,
            found: arg.scalar_type,
        });
    }
    Ok(())
}

fn date_pairs<'a>(
    column: &str,
    func: CreateFunc,
    date: &'a TypedColumn,
    dob: &'a TypedColumn,
) -> Result<impl Iterator<Item = Option<(NaiveDateTime, NaiveDateTime)>> + 'a> {
    expect_type(column, func, date, ScalarType::Date)?;
    expect_type(column, func, dob, ScalarType::Date)?;

    Ok(date.values.iter().zip(&dob.values).map(|(date, dob)| {
        let date = date.as_ref().and_then(ScalarValue::as_datetime)?;
        let dob = dob.as_ref().and_then(ScalarValue::as_datetime)?;
        Some((date, dob))
    }))
}
