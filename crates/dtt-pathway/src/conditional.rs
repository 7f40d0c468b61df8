//! Relative conditionals that gate pathway leaves.

use std::fmt;

use dtt_codec::{NaturalValue, flatten, read_value};
use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Tag};
use regex::Regex;

use crate::error::{PathwayError, Result};
use crate::pathway::{SEPARATOR, resolve_walk, sequence_items};

/// Where a conditional looks for the values it tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `.`: the leaf value itself, flattened to text.
    Leaf,
    /// `[]`: each value of the leaf; values that do not match are dropped.
    EachValue,
    /// `..`: the item holding the leaf. Every further `..` climbs one level.
    Ancestor(usize),
    /// `[..]`: every item produced by the same expansion as the item holding
    /// the leaf, that item included.
    Siblings,
}

/// A relative pathway plus the pattern its values are tested against.
///
/// The conditional accepts a leaf when any value it locates matches.
#[derive(Debug, Clone)]
pub struct Conditional {
    text: String,
    relation: Relation,
    tokens: Vec<Tag>,
    pattern: Regex,
}

impl Conditional {
    /// Parse `pathway` (e.g. `..->ValueType`) and compile `pattern`.
    pub fn parse(dict: &Dictionary, pathway: &str, pattern: &str) -> Result<Self> {
        let text = pathway.trim();
        let invalid = |reason| PathwayError::InvalidConditional {
            conditional: text.to_string(),
            reason,
        };

        let (relation, rest): (Relation, Vec<&str>) = match text {
            "." => (Relation::Leaf, Vec::new()),
            "[]" => (Relation::EachValue, Vec::new()),
            _ => {
                let parts: Vec<&str> = text.split(SEPARATOR).map(str::trim).collect();
                let relation = match parts[0] {
                    "[..]" => Relation::Siblings,
                    ".." => Relation::Ancestor(parts.iter().take_while(|part| **part == "..").count()),
                    _ => return Err(invalid("must start with '.', '..', '[..]' or '[]'")),
                };
                let skip = match relation {
                    Relation::Ancestor(levels) => levels,
                    _ => 1,
                };
                let rest = parts[skip..].to_vec();
                if rest.is_empty() {
                    return Err(invalid("a relative operator must be followed by a pathway"));
                }
                if rest.iter().any(|part| is_operator(part)) {
                    return Err(invalid("relative operators may only lead"));
                }
                (relation, rest)
            }
        };

        let tokens = if rest.is_empty() {
            Vec::new()
        } else {
            resolve_walk(dict, text, &rest)?
        };
        Ok(Self {
            text: text.to_string(),
            relation,
            tokens,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn tokens(&self) -> &[Tag] {
        &self.tokens
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Whether any value located from `dataset` along the conditional's
    /// tokens matches.
    pub(crate) fn test(&self, dataset: &Dataset) -> Result<bool> {
        let mut located = Vec::new();
        locate(dataset, &self.tokens, &mut located)?;
        Ok(located.iter().any(|text| self.is_match(text)))
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =~ /{}/", self.text, self.pattern)
    }
}

fn is_operator(part: &str) -> bool {
    matches!(part, "." | ".." | "[..]" | "[]")
}

fn locate(dataset: &Dataset, tokens: &[Tag], out: &mut Vec<String>) -> Result<()> {
    let Some((tag, rest)) = tokens.split_first() else {
        return Ok(());
    };
    if rest.is_empty() {
        if let Some(item) = dataset.get(tag) {
            match read_value(dataset, item)? {
                NaturalValue::Null => {}
                NaturalValue::Scalar(scalar) => out.push(scalar.to_string()),
                NaturalValue::Array(values) => out.extend(values.iter().map(ToString::to_string)),
                nested => out.extend(flatten(&nested)),
            }
        }
        return Ok(());
    }
    for nested in sequence_items(dataset, tag)? {
        locate(nested, rest, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> &'static Dictionary {
        Dictionary::standard()
    }

    #[test]
    fn test_relations() {
        let leaf = Conditional::parse(dict(), ".", "^A").unwrap();
        assert_eq!(leaf.relation(), Relation::Leaf);
        assert!(leaf.tokens().is_empty());

        let each = Conditional::parse(dict(), "[]", "^A").unwrap();
        assert_eq!(each.relation(), Relation::EachValue);

        let parent = Conditional::parse(dict(), "..->ValueType", "TEXT").unwrap();
        assert_eq!(parent.relation(), Relation::Ancestor(1));
        assert_eq!(parent.tokens(), &[Tag::new(0x0040, 0xA040)]);

        let grand = Conditional::parse(dict(), "..->..->ValueType", "TEXT").unwrap();
        assert_eq!(grand.relation(), Relation::Ancestor(2));

        let siblings = Conditional::parse(dict(), "[..]->ContentSequence->ValueType", "CODE").unwrap();
        assert_eq!(siblings.relation(), Relation::Siblings);
        assert_eq!(siblings.tokens().len(), 2);
    }

    #[test]
    fn test_grammar_errors() {
        for text in ["ValueType", "..", "[..]", "..->[]->ValueType", "[..]->..->ValueType"] {
            assert!(
                matches!(
                    Conditional::parse(dict(), text, "x"),
                    Err(PathwayError::InvalidConditional { .. })
                ),
                "{text}"
            );
        }
        assert!(matches!(
            Conditional::parse(dict(), "..->ContentSequence", "x"),
            Err(PathwayError::SequenceLeaf { .. })
        ));
        assert!(matches!(
            Conditional::parse(dict(), ".", "("),
            Err(PathwayError::Regex(_))
        ));
    }
}
