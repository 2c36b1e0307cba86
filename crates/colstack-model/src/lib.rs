//! Data model for the column-stack pipeline.
//!
//! - **scalar**: [`ScalarType`] tags and typed [`ScalarValue`] cells
//! - **registry**: the static, read-only type registry (parse functions and
//!   interval sentinels)
//! - **config**: the declarative per-column configuration ([`ColumnStack`])

mod config;
mod error;
mod registry;
mod scalar;

pub use config::{
    BINNED_SUFFIX, BinInclude, BinSpec, ColumnOptions, ColumnStack, CreateFunc, FilterOp,
    OverlapPolicy, ParseFunc,
};
pub use error::{ModelError, Result};
pub use registry::{ParseFn, TypeInfo, TypeRegistry, registry};
pub use scalar::{MILLIS_PER_DAY, ScalarType, ScalarValue, format_numeric};
