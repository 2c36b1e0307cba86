//! Tabular ingestion for the column-stack pipeline.
//!
//! This crate loads CSV input into Polars DataFrames and writes rendered
//! frames back out.
//!
//! # Features
//!
//! - **CSV Loading**: every column is read as raw text, empty fields as null
//! - **Pre-flight checks**: file size limit, UTF-16 rejection, blank header names
//! - **CSV Export**: header row plus one record per frame row
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use colstack_ingest::{read_csv_table, write_csv_table};
//!
//! let df = read_csv_table(Path::new("data/patients.csv"))?;
//! write_csv_table(&df, Path::new("data/patients_copy.csv"))?;
//! ```

mod csv;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use self::csv::{
    MAX_CSV_FILE_SIZE, cell_text, check_file_size, check_file_size_with_limit, read_csv_table,
    validate_dataframe_shape, validate_encoding, write_csv_table,
};
