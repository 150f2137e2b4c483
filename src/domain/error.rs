//! Error types for the growth engine.

use thiserror::Error;

/// Errors raised by kernel construction, seeding, growth and history access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// Unknown kernel name, unsupported dimensionality, or mismatched shapes.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A numeric parameter is outside its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// History access past the stored length.
    #[error("index {index} out of range for history of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of stored snapshots.
        len: usize,
    },

    /// No rule with this name in the rule table.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),
}

pub type GrowthResult<T> = Result<T, GrowthError>;
