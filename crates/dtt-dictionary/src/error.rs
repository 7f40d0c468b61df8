//! Error types for dictionary lookups and loading.

use dtt_model::Tag;
use thiserror::Error;

/// Errors raised by dictionary lookups.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DictionaryError {
    /// No entry carries this keyword.
    #[error("unknown keyword: '{keyword}'")]
    UnknownKeyword { keyword: String },

    /// Token is neither a keyword nor tag text.
    #[error("'{token}' is not a keyword or tag")]
    InvalidToken { token: String },

    /// A private tag cannot be interpreted without its creator.
    #[error("private creator missing for {tag}: {}", describe_creator(.creator))]
    PrivateCreatorMissing { tag: Tag, creator: Option<String> },

    /// Failed to parse a dictionary CSV file.
    #[error("failed to parse {file}: {message}")]
    CsvParse { file: &'static str, message: String },

    /// Invalid value in a dictionary CSV field.
    #[error("invalid {field} value '{value}' in {file}")]
    InvalidValue {
        field: &'static str,
        value: String,
        file: &'static str,
    },
}

fn describe_creator(creator: &Option<String>) -> String {
    match creator {
        Some(creator) => format!("'{creator}' is not registered"),
        None => "no creator bound".to_string(),
    }
}

/// Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, DictionaryError>;

impl DictionaryError {
    /// Create an UnknownKeyword error.
    pub fn unknown_keyword(keyword: impl Into<String>) -> Self {
        Self::UnknownKeyword {
            keyword: keyword.into(),
        }
    }

    /// Create a PrivateCreatorMissing error.
    pub fn creator_missing(tag: Tag, creator: Option<&str>) -> Self {
        Self::PrivateCreatorMissing {
            tag,
            creator: creator.map(str::to_string),
        }
    }
}
