//! Error types for natural type mapping.

use thiserror::Error;

use crate::NaturalKind;

/// Errors raised while mapping representations to natural types.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// Representation code is not one of the known VRs.
    #[error("unknown value representation: '{code}'")]
    UnknownVr { code: String },

    /// No representation to map.
    #[error("no value representation given")]
    NoRepresentation,

    /// Two representations cannot share one storage type.
    #[error("incompatible types: {left} and {right}")]
    IncompatibleTypes { left: NaturalKind, right: NaturalKind },

    /// Column is neither a dictionary keyword nor explicitly typed.
    #[error("column '{column}' in table '{table}' has no type")]
    MissingType { table: String, column: String },

    /// Column name appears twice in one table.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },
}

/// Result type for type mapping.
pub type Result<T> = std::result::Result<T, TypeError>;
