//! Serializable pathway requests, as carried in table templates.

use dtt_dictionary::Dictionary;
use serde::{Deserialize, Serialize};

use crate::conditional::Conditional;
use crate::error::Result;
use crate::pathway::Pathway;

/// A column whose value is lifted out of nested sequences by a pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevationRequest {
    pub column_name: String,
    pub pathway: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRequest>,
}

/// Text form of a [`Conditional`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRequest {
    pub pathway: String,
    pub regex: String,
}

impl ElevationRequest {
    pub fn new(column_name: impl Into<String>, pathway: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            pathway: pathway.into(),
            conditional: None,
        }
    }

    #[must_use]
    pub fn with_conditional(mut self, pathway: impl Into<String>, regex: impl Into<String>) -> Self {
        self.conditional = Some(ConditionalRequest {
            pathway: pathway.into(),
            regex: regex.into(),
        });
        self
    }

    /// Parse the pathway and its conditional.
    pub fn compile(&self, dict: &Dictionary) -> Result<Pathway> {
        let pathway = Pathway::parse(dict, &self.pathway)?;
        match &self.conditional {
            Some(request) => {
                let conditional = Conditional::parse(dict, &request.pathway, &request.regex)?;
                Ok(pathway.with_conditional(conditional))
            }
            None => Ok(pathway),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_from_json() {
        let request: ElevationRequest = serde_json::from_str(
            r#"{
                "column_name": "finding",
                "pathway": "ContentSequence->TextValue+",
                "conditional": { "pathway": "..->ValueType", "regex": "^TEXT$" }
            }"#,
        )
        .unwrap();
        let pathway = request.compile(Dictionary::standard()).unwrap();
        assert!(pathway.joins_branches());
        assert_eq!(pathway.conditional().map(Conditional::pattern), Some("^TEXT$"));
    }

    #[test]
    fn test_conditional_is_optional() {
        let request: ElevationRequest =
            serde_json::from_str(r#"{"column_name":"c","pathway":"ContentSequence->TextValue"}"#).unwrap();
        assert_eq!(request, ElevationRequest::new("c", "ContentSequence->TextValue"));
        assert!(request.compile(Dictionary::standard()).unwrap().conditional().is_none());
    }
}
