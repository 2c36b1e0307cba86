//! Error types for the column-stack model.

use thiserror::Error;

use crate::scalar::ScalarType;

/// Errors raised while resolving types or parsing configuration values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A dtype tag has no registered parse function.
    #[error("data type `{tag}` is not known; options are: {known}")]
    UnknownScalarType {
        /// The unrecognised tag.
        tag: String,
        /// Comma separated list of registered tags.
        known: String,
    },

    /// Text could not be parsed as a value of the requested type.
    #[error("cannot parse '{text}' as {scalar_type}")]
    ValueParse {
        /// The offending text.
        text: String,
        /// The target type.
        scalar_type: ScalarType,
    },

    /// The configuration document could not be decoded.
    #[error("invalid column stack configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
