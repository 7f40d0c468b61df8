//! Error types for the model crate.

use thiserror::Error;

use crate::{Tag, Vr};

/// Errors raised while building tags, items and datasets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Tag text is not in any recognised form.
    #[error("invalid tag: '{text}'")]
    InvalidTag { text: String },

    /// Unknown value representation code.
    #[error("unrecognised value representation: '{code}'")]
    InvalidVr { code: String },

    /// Multiplicity text is not in any recognised form.
    #[error("invalid value multiplicity: '{text}'")]
    InvalidMultiplicity { text: String },

    /// Payload does not fit the declared value representation.
    #[error("{payload} payload cannot be stored in {tag} with VR {vr}")]
    ValueMismatch {
        tag: Tag,
        vr: Vr,
        payload: &'static str,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    /// Create an InvalidTag error.
    pub fn invalid_tag(text: impl Into<String>) -> Self {
        Self::InvalidTag { text: text.into() }
    }

    /// Create an InvalidVr error.
    pub fn invalid_vr(code: impl Into<String>) -> Self {
        Self::InvalidVr { code: code.into() }
    }
}
