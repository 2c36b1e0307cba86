//! Binning engine for typed columns.
//!
//! Turns named bin expressions into a disjoint partition of a column's rows.
//!
//! # Features
//!
//! - **Expressions**: intervals (`[a..b]`, `(a..]`, `[..b)`) and enumerations (`[a,b,c]`)
//! - **Sentinels**: unbounded interval sides resolve to the type's domain extremes
//! - **Reserved bins**: optional `other` (unclaimed non-null rows) and `NA` (null rows)
//! - **Overlap policy**: overlapping bins are rejected, or resolved by declaration order
//!
//! # Example
//!
//! ```
//! use colstack_binning::{BinSet, build_partition};
//! use colstack_model::{BinInclude, BinSpec, OverlapPolicy, ScalarType, ScalarValue};
//!
//! let spec: BinSpec = [("low", "[..3]"), ("high", "(3..)")].into_iter().collect();
//! let bins = BinSet::from_spec(&spec, ScalarType::Int, BinInclude::new(false, true), OverlapPolicy::Reject)?;
//!
//! let column = vec![Some(ScalarValue::Int(1)), None, Some(ScalarValue::Int(9))];
//! let partition = build_partition(&column, &bins)?;
//!
//! assert_eq!(partition.get("low"), Some(&[0][..]));
//! assert_eq!(partition.get("high"), Some(&[2][..]));
//! assert_eq!(partition.get("NA"), Some(&[1][..]));
//! # Ok::<(), colstack_binning::BinError>(())
//! ```

mod bounds;
mod error;
mod eval;
mod expr;
mod materialize;
mod partition;

// === Error Types ===
pub use error::{BinError, Result};

// === Expressions ===
pub use bounds::resolve_bounds;
pub use expr::{BinExpression, Endpoint, INTERVAL_SEP, LIST_SEP};

// === Evaluation ===
pub use eval::{Comparison, Predicate, evaluate, null_mask};

// === Partitions ===
pub use materialize::{apply_bins, group_labels, label_rows};
pub use partition::{Bin, BinSet, NULL_LABEL, OTHER_LABEL, Partition, build_partition};
