//! Error types for the column-stack pipeline.

use colstack_binning::BinError;
use colstack_ingest::IngestError;
use colstack_model::{ModelError, ScalarType};
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while rendering a column stack.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Configuration Errors ===
    /// Invalid configuration document or dtype tag.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Bin configuration of a column failed to parse or evaluate.
    #[error("binning column '{column}' failed: {source}")]
    Bin {
        column: String,
        #[source]
        source: BinError,
    },

    /// Creation function called with the wrong number of argument columns.
    #[error("column '{column}': {func} takes {expected} argument columns, got {found}")]
    CreateArity {
        column: String,
        func: &'static str,
        expected: usize,
        found: usize,
    },

    /// Required keyword argument missing.
    #[error("{func} requires keyword argument '{name}'")]
    MissingKwarg { func: &'static str, name: &'static str },

    /// Keyword argument present but unusable.
    #[error("{func} keyword argument '{name}' is invalid: {reason}")]
    InvalidKwarg {
        func: &'static str,
        name: &'static str,
        reason: String,
    },

    /// Filter value cannot be parsed with the column's dtype.
    #[error("filter {op} on column '{column}': cannot use {value} as {scalar_type}")]
    FilterValue {
        column: String,
        op: &'static str,
        value: String,
        scalar_type: ScalarType,
    },

    // === Data Errors ===
    /// Column referenced by the configuration is not in the frame.
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A cell failed dtype coercion.
    #[error("column '{column}' row {row}: cannot convert '{text}' to {scalar_type}")]
    Coerce {
        column: String,
        row: usize,
        text: String,
        scalar_type: ScalarType,
    },

    /// Creation function received a column of the wrong type.
    #[error("column '{column}': {func} expects {expected} values, found {found}")]
    ArgumentType {
        column: String,
        func: &'static str,
        expected: ScalarType,
        found: ScalarType,
    },

    /// Frame column with a storage type the pipeline does not handle.
    #[error("column '{column}' has unsupported storage type {dtype}")]
    UnsupportedStorage { column: String, dtype: String },

    // === I/O and DataFrame Errors ===
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, TransformError>;
