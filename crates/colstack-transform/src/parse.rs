//! Text-level parse functions, applied before dtype coercion.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use colstack_model::ParseFunc;

use crate::error::{Result, TransformError};

/// Applies one parse function to a text column.
///
/// # Errors
///
/// Fails if a required keyword argument is missing or is not a valid format.
pub fn apply_parse_func(
    func: ParseFunc,
    kwargs: &BTreeMap<String, String>,
    values: Vec<Option<String>>,
) -> Result<Vec<Option<String>>> {
    match func {
        ParseFunc::Id => Ok(values),
        ParseFunc::ToDateStr => {
            let input_format = kwarg(kwargs, "to_date_str", "input_format")?;
            let output_format = kwarg(kwargs, "to_date_str", "output_format")?;
            check_format("input_format", input_format)?;
            check_format("output_format", output_format)?;

            Ok(values
                .into_iter()
                .map(|value| {
                    value.and_then(|text| reformat_date(&text, input_format, output_format))
                })
                .collect())
        }
    }
}

/// Re-renders `text` from `input_format` to `output_format`.
///
/// Text that does not match `input_format` yields `None`.
pub fn reformat_date(text: &str, input_format: &str, output_format: &str) -> Option<String> {
    let parsed = NaiveDateTime::parse_from_str(text, input_format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, input_format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    let mut out = String::new();
    write!(out, "{}", parsed.format(output_format)).ok()?;
    Some(out)
}

fn kwarg<'a>(
    kwargs: &'a BTreeMap<String, String>,
    func: &'static str,
    name: &'static str,
) -> Result<&'a str> {
    kwargs
        .get(name)
        .map(String::as_str)
        .ok_or(TransformError::MissingKwarg { func, name })
}

fn check_format(name: &'static str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TransformError::InvalidKwarg {
            func: "to_date_str",
            name,
            reason: format!("'{format}' is not a valid date format"),
        });
    }
    Ok(())
}
