//! Error types for document encoding and decoding.

use dtt_dictionary::DictionaryError;
use dtt_model::{ModelError, Vr};
use thiserror::Error;

/// Errors raised by the BSON and JSON codecs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// Keyword, tag or private creator could not be resolved.
    #[error(transparent)]
    Lookup(#[from] DictionaryError),

    /// Key is neither a keyword nor a `(gggg,eeee)-Keyword` form.
    #[error("invalid document key: '{key}'")]
    InvalidKey { key: String },

    /// Value representation cannot be inferred and no `vr` was given.
    #[error("'{key}' needs an explicit vr: the dictionary allows {allowed}")]
    MissingVr { key: String, allowed: String },

    /// Value cannot be encoded or decoded under its representation.
    #[error("invalid {vr} value for '{key}': {raw}")]
    Format { key: String, vr: Vr, raw: String },

    /// Document node has the wrong shape.
    #[error("'{key}': expected {expected}")]
    Shape { key: String, expected: &'static str },

    /// Item construction failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// BSON serialization failed.
    #[error("BSON write error: {0}")]
    BsonWrite(#[from] bson::ser::Error),

    /// BSON deserialization failed.
    #[error("BSON read error: {0}")]
    BsonRead(#[from] bson::de::Error),

    /// JSON text could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

impl DocumentError {
    /// Create a Format error.
    pub fn format(key: &str, vr: Vr, raw: impl Into<String>) -> Self {
        Self::Format {
            key: key.to_string(),
            vr,
            raw: raw.into(),
        }
    }

    /// Create a Shape error.
    pub fn shape(key: &str, expected: &'static str) -> Self {
        Self::Shape {
            key: key.to_string(),
            expected,
        }
    }

    /// Whether this is a lookup failure (unknown keyword, unresolved creator
    /// or missing representation).
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::InvalidKey { .. } | Self::MissingVr { .. })
    }
}
