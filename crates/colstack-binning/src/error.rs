//! Error types for the binning engine.

use colstack_model::{ModelError, ScalarType};
use thiserror::Error;

/// Errors raised while parsing bin expressions or building partitions.
///
/// All of these indicate a configuration defect; none are transient.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BinError {
    /// Interval requested for a type without domain sentinels.
    #[error("interval bins are not supported for {scalar_type} columns")]
    UnsupportedBoundType { scalar_type: ScalarType },

    /// Malformed expression, or a bound/member that fails the type's parser.
    #[error("invalid bin expression '{text}' for {scalar_type}: {reason}")]
    BinExpressionParse {
        /// The offending substring.
        text: String,
        scalar_type: ScalarType,
        reason: String,
    },

    /// Two or more user bins claim the same row.
    #[error("row {row} is claimed by overlapping bins: {}", bins.join(", "))]
    OverlappingBin { row: usize, bins: Vec<String> },

    /// Dtype tag without a registered parse function.
    #[error("unknown scalar type `{tag}`")]
    UnknownScalarType { tag: String },

    #[error("bin name '{name}' is declared more than once")]
    DuplicateBinName { name: String },

    /// A user bin uses a reserved label that is also enabled.
    #[error("bin name '{name}' is reserved")]
    ReservedBinName { name: String },
}

impl BinError {
    pub(crate) fn parse(text: &str, scalar_type: ScalarType, reason: impl Into<String>) -> Self {
        Self::BinExpressionParse {
            text: text.to_string(),
            scalar_type,
            reason: reason.into(),
        }
    }

    /// Maps a failed registry parse of `text` into the binning taxonomy.
    pub(crate) fn from_value_parse(err: ModelError, text: &str, scalar_type: ScalarType) -> Self {
        match err {
            ModelError::UnknownScalarType { tag, .. } => Self::UnknownScalarType { tag },
            _ => Self::parse(text, scalar_type, format!("not a valid {scalar_type} value")),
        }
    }
}

/// Result type for binning operations.
pub type Result<T> = std::result::Result<T, BinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_display() {
        let err = BinError::OverlappingBin {
            row: 4,
            bins: vec!["low".to_string(), "mid".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "row 4 is claimed by overlapping bins: low, mid"
        );
    }
}
