//! Column-stack pipeline.
//!
//! A [`StackHandler`] holds an ingested table and a declarative
//! [`ColumnStack`](colstack_model::ColumnStack). Rendering applies the stack
//! in a fixed order: namespace aliases, parse functions, dtypes of source
//! columns, column creation, dtypes of created columns, filters, bins.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use colstack_transform::StackHandler;
//!
//! let mut handler = StackHandler::from_csv(Path::new("data/patients.csv"))?;
//! handler.load_json(&std::fs::read_to_string("config.json")?)?;
//! println!("{}", handler.frame());
//! ```

mod create;
mod error;
mod filter;
mod frame;
mod handler;
mod parse;
mod pipeline;

// === Error Types ===
pub use error::{Result, TransformError};

// === Handler ===
pub use handler::StackHandler;
pub use pipeline::{render_stack, resolve_type};

// === Stage Functions ===
pub use create::{DAYS_PER_YEAR, col_for_lot, create_column, next_lot_date};
pub use filter::{filter_mask, holds};
pub use frame::{
    TypedColumn, json_text, read_column, read_column_native, read_values, storage_scalar_type,
    text_values, write_column, write_text_column,
};
pub use parse::{apply_parse_func, reformat_date};
