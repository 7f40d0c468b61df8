//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Strictness of numeric string handling in JSON documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    /// Trim NUL and whitespace padding; IS accepts any integer.
    #[default]
    Lenient,
    /// Trim spaces only; reject NUL; IS must fit a signed 32-bit integer.
    Strict,
}

/// Options shared by the BSON and JSON codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Embed binary values inline instead of omitting them.
    pub embed_binary: bool,
    /// Numeric string handling for JSON.
    pub json_mode: JsonMode,
}

impl DocumentOptions {
    /// Default options: lenient JSON, binary values omitted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable binary embedding.
    #[must_use]
    pub fn with_embed_binary(mut self, embed: bool) -> Self {
        self.embed_binary = embed;
        self
    }

    /// Set the JSON mode.
    #[must_use]
    pub fn with_json_mode(mut self, mode: JsonMode) -> Self {
        self.json_mode = mode;
        self
    }

    /// Shorthand for strict JSON mode.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_json_mode(JsonMode::Strict)
    }
}
