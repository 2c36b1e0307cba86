//! Rendering stages, applied in a fixed order to a copy of the raw frame.
//!
//! 1. namespace aliases
//! 2. parse functions
//! 3. dtypes of source columns
//! 4. column creation
//! 5. dtypes of created columns
//! 6. filters
//! 7. bins

use std::collections::BTreeMap;

use colstack_binning::{BinSet, apply_bins};
use colstack_model::{ColumnStack, ScalarType};
use polars::prelude::*;
use tracing::info;

use crate::create::create_column;
use crate::error::{Result, TransformError};
use crate::filter::filter_mask;
use crate::frame::{
    TypedColumn, read_column, read_column_native, storage_scalar_type, text_values, write_column,
    write_text_column,
};
use crate::parse::apply_parse_func;

/// Runs every stage of `stack` over a copy of `raw`.
///
/// # Errors
///
/// Fails on the first stage error; `raw` is never modified.
pub fn render_stack(stack: &ColumnStack, raw: &DataFrame) -> Result<DataFrame> {
    let mut df = raw.clone();
    apply_namespace(stack, &mut df)?;
    parse_columns(stack, &mut df)?;
    coerce_columns(stack, &mut df, false)?;
    create_columns(stack, &mut df)?;
    coerce_columns(stack, &mut df, true)?;
    let mut df = filter_rows(stack, df)?;
    bin_columns(stack, &mut df)?;
    Ok(df)
}

/// Scalar type of a frame column: its storage type, refined to the declared
/// dtype when the column is stored as text.
pub fn resolve_type(stack: &ColumnStack, df: &DataFrame, name: &str) -> Result<ScalarType> {
    let column = frame_column(df, name)?;
    let storage = storage_scalar_type(column)?;
    let declared = stack.get(name).and_then(|c| c.dtype);
    Ok(match declared {
        Some(declared @ (ScalarType::Str | ScalarType::Category)) if storage == ScalarType::Str => {
            declared
        }
        _ => storage,
    })
}

fn apply_namespace(stack: &ColumnStack, df: &mut DataFrame) -> Result<()> {
    for (new_name, old_name) in &stack.name_space {
        info!(column = %new_name, source = %old_name, "Aliasing column");
        let column = frame_column(df, old_name)?
            .clone()
            .with_name(new_name.as_str().into());
        df.with_column(column)?;
    }
    Ok(())
}

fn parse_columns(stack: &ColumnStack, df: &mut DataFrame) -> Result<()> {
    let no_kwargs = BTreeMap::new();
    for options in stack.parsed_columns() {
        let mut values = text_values(frame_column(df, &options.name)?)?;
        for (idx, &func) in options.parse_funcs.iter().enumerate() {
            info!(column = %options.name, func = func.name(), "Parsing column");
            let kwargs = options.parse_kwargs.get(idx).unwrap_or(&no_kwargs);
            values = apply_parse_func(func, kwargs, values)?;
        }
        df.with_column(write_text_column(&options.name, values))?;
    }
    Ok(())
}

fn coerce_columns(stack: &ColumnStack, df: &mut DataFrame, created: bool) -> Result<()> {
    let columns = stack
        .column_options
        .iter()
        .filter(|c| c.is_created() == created);

    for options in columns {
        let Some(dtype) = options.dtype else {
            continue;
        };
        info!(column = %options.name, dtype = %dtype, "Converting data type");
        let typed = if created {
            read_column_native(df, &options.name)?.coerce(&options.name, dtype)?
        } else {
            read_column(df, &options.name, dtype)?
        };
        df.with_column(write_column(&options.name, &typed)?)?;
    }
    Ok(())
}

fn create_columns(stack: &ColumnStack, df: &mut DataFrame) -> Result<()> {
    for options in stack.created_columns() {
        let Some(func) = options.create_func else {
            continue;
        };
        info!(column = %options.name, func = func.name(), "Creating column");

        let args = options
            .create_args
            .iter()
            .map(|arg| read_column(df, arg, resolve_type(stack, df, arg)?))
            .collect::<Result<Vec<TypedColumn>>>()?;
        let created = create_column(&options.name, func, &args, &options.create_kwargs)?;
        df.with_column(write_column(&options.name, &created)?)?;
    }
    Ok(())
}

fn filter_rows(stack: &ColumnStack, df: DataFrame) -> Result<DataFrame> {
    let mut mask = vec![true; df.height()];
    let mut filtered = false;

    for options in stack.filtered_columns() {
        info!(column = %options.name, filters = options.filters.len(), "Filtering on column");
        let scalar_type = resolve_type(stack, &df, &options.name)?;
        let values = read_column(&df, &options.name, scalar_type)?.values;
        let column_mask = filter_mask(&options.name, &values, scalar_type, &options.filters)?;
        for (keep, pass) in mask.iter_mut().zip(column_mask) {
            *keep &= pass;
        }
        filtered = true;
    }

    if !filtered {
        return Ok(df);
    }

    let before = df.height();
    let df = df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?;
    info!(rows_before = before, rows_after = df.height(), "Filters applied");
    Ok(df)
}

fn bin_columns(stack: &ColumnStack, df: &mut DataFrame) -> Result<()> {
    for options in stack.binned_columns() {
        let output = options.binned_column_name();
        info!(column = %options.name, output = %output, bins = options.bins.len(), "Binning column");

        let scalar_type = resolve_type(stack, df, &options.name)?;
        let values = read_column(df, &options.name, scalar_type)?.values;
        let bin_error = |source| TransformError::Bin {
            column: options.name.clone(),
            source,
        };
        let bin_set = BinSet::from_spec(
            &options.bins,
            scalar_type,
            options.bin_include,
            options.bin_overlap,
        )
        .map_err(bin_error)?;
        let labels = apply_bins(&values, &bin_set).map_err(bin_error)?;

        df.with_column(write_text_column(&output, labels))?;
    }
    Ok(())
}

fn frame_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| TransformError::ColumnNotFound {
        column: name.to_string(),
    })
}
