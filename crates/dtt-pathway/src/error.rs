//! Error types for pathway parsing and evaluation.

use dtt_codec::ValueError;
use dtt_dictionary::DictionaryError;
use thiserror::Error;

/// Errors raised while parsing or evaluating a pathway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PathwayError {
    /// A token is not a known keyword or tag.
    #[error(transparent)]
    Lookup(#[from] DictionaryError),

    /// Reading a leaf value failed.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Fewer than two navigation tokens.
    #[error("pathway '{pathway}' needs at least two tokens")]
    TooShort { pathway: String },

    /// A non-final token cannot hold nested items.
    #[error("'{token}' in pathway '{pathway}' is not a sequence")]
    NotSequence { pathway: String, token: String },

    /// The final token can only hold nested items.
    #[error("pathway '{pathway}' ends in sequence '{token}'")]
    SequenceLeaf { pathway: String, token: String },

    /// Conditional text does not follow the relative grammar.
    #[error("invalid conditional '{conditional}': {reason}")]
    InvalidConditional {
        conditional: String,
        reason: &'static str,
    },

    /// Conditional pattern failed to compile.
    #[error("invalid conditional pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A leaf held several values and `&` was not given.
    #[error("pathway '{pathway}' found {count} values in one attribute; append '&' to join them")]
    Multiplicity { pathway: String, count: usize },

    /// Several branches matched and `+` was not given.
    #[error("pathway '{pathway}' matched {branches} branches; append '+' to join them")]
    Ambiguous { pathway: String, branches: usize },
}

/// Result type for pathway operations.
pub type Result<T> = std::result::Result<T, PathwayError>;

impl PathwayError {
    /// True for errors raised by evaluation rather than by parsing.
    #[must_use]
    pub fn is_aggregation(&self) -> bool {
        matches!(self, Self::Multiplicity { .. } | Self::Ambiguous { .. })
    }
}
