//! Error types for the value codec.

use dtt_dictionary::DictionaryError;
use dtt_model::{ModelError, Tag, Vr};
use thiserror::Error;

/// Errors raised while reading or writing values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValueError {
    /// Caller passed an item or dataset the operation cannot work on.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Stored text cannot be parsed as its representation.
    #[error("invalid {vr} value for {tag}: '{raw}'")]
    Format { tag: Tag, vr: Vr, raw: String },

    /// No representation of the tag accepts the value.
    #[error("cannot store {kind} value in {tag}")]
    UnsupportedValue { tag: Tag, kind: &'static str },

    /// Sequence expansion requested for a non-sequence attribute.
    #[error("{tag} is not a sequence ({vr})")]
    NotSequence { tag: Tag, vr: Vr },

    /// Item construction failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Dictionary lookup failed.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}

/// Result type for value codec operations.
pub type Result<T> = std::result::Result<T, ValueError>;

impl ValueError {
    /// Create a Format error.
    pub fn format(tag: &Tag, vr: Vr, raw: impl Into<String>) -> Self {
        Self::Format {
            tag: tag.clone(),
            vr,
            raw: raw.into(),
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_names_tag_and_text() {
        let err = ValueError::format(&Tag::new(0x0018, 0x0050), Vr::DS, "1.2.3");
        assert_eq!(err.to_string(), "invalid DS value for (0018,0050): '1.2.3'");
    }
}
