//! Pathway parsing and evaluation.

use std::fmt;
use std::ops::Range;

use dtt_codec::{NaturalValue, Scalar, flatten, read_value};
use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Tag, Value};

use crate::conditional::{Conditional, Relation};
use crate::error::{PathwayError, Result};

/// Separator between navigation tokens.
pub const SEPARATOR: &str = "->";

/// A walk through nested sequence items ending in a non-sequence attribute.
///
/// Text form: `Token(->Token)+` followed by optional modifiers in any order:
/// `+` joins results from several branches with newlines and `&` joins the
/// values of one multi-valued leaf with backslashes.
#[derive(Debug, Clone)]
pub struct Pathway {
    text: String,
    tokens: Vec<Tag>,
    join_branches: bool,
    join_values: bool,
    conditional: Option<Conditional>,
}

impl Pathway {
    /// Parse pathway text, resolving every token against `dict`.
    pub fn parse(dict: &Dictionary, text: &str) -> Result<Self> {
        let mut body = text.trim();
        let mut join_branches = false;
        let mut join_values = false;
        loop {
            if let Some(rest) = body.strip_suffix('+') {
                join_branches = true;
                body = rest.trim_end();
            } else if let Some(rest) = body.strip_suffix('&') {
                join_values = true;
                body = rest.trim_end();
            } else {
                break;
            }
        }

        let parts: Vec<&str> = body.split(SEPARATOR).map(str::trim).collect();
        if parts.len() < 2 {
            return Err(PathwayError::TooShort {
                pathway: text.to_string(),
            });
        }
        let tokens = resolve_walk(dict, text, &parts)?;
        Ok(Self {
            text: text.trim().to_string(),
            tokens,
            join_branches,
            join_values,
            conditional: None,
        })
    }

    /// Gate leaf matches with `conditional`.
    #[must_use]
    pub fn with_conditional(mut self, conditional: Conditional) -> Self {
        self.conditional = Some(conditional);
        self
    }

    /// The text this pathway was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Tag] {
        &self.tokens
    }

    pub fn joins_branches(&self) -> bool {
        self.join_branches
    }

    pub fn joins_values(&self) -> bool {
        self.join_values
    }

    pub fn conditional(&self) -> Option<&Conditional> {
        self.conditional.as_ref()
    }

    /// Evaluate against `dataset`.
    ///
    /// Returns null when no branch matches, the leaf's natural value when one
    /// does, and a newline-joined string when several do and `+` was given.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<NaturalValue> {
        let mut walk = Walk {
            pathway: self,
            arena: vec![Instance {
                dataset,
                parent: None,
                siblings: 0..1,
            }],
            matches: Vec::new(),
        };
        walk.descend(0, 0)?;

        let mut matches = walk.matches;
        match matches.len() {
            0 => Ok(NaturalValue::Null),
            1 => Ok(matches.pop().unwrap_or_default()),
            _ if self.join_branches => {
                let joined = matches
                    .iter()
                    .filter_map(flatten)
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(NaturalValue::Scalar(Scalar::String(joined)))
            }
            branches => Err(PathwayError::Ambiguous {
                pathway: self.text.clone(),
                branches,
            }),
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Resolve a walk of tokens: every token but the last must allow SQ and the
/// last must not be SQ only.
pub(crate) fn resolve_walk(dict: &Dictionary, text: &str, parts: &[&str]) -> Result<Vec<Tag>> {
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let tag = dict.resolve_token(part)?;
            let entry = dict.by_tag(&tag);
            if index < last && !entry.allows_sequence() {
                return Err(PathwayError::NotSequence {
                    pathway: text.to_string(),
                    token: (*part).to_string(),
                });
            }
            if index == last && entry.is_sequence_only() {
                return Err(PathwayError::SequenceLeaf {
                    pathway: text.to_string(),
                    token: (*part).to_string(),
                });
            }
            Ok(tag)
        })
        .collect()
}

/// One nested item reached during evaluation.
#[derive(Debug)]
pub(crate) struct Instance<'a> {
    pub dataset: &'a Dataset,
    pub parent: Option<usize>,
    /// Arena slots filled by the same expansion, this instance included.
    pub siblings: Range<usize>,
}

/// Depth-first evaluation state; instances live in an arena so conditionals
/// can reach parents and siblings by index.
struct Walk<'p, 'a> {
    pathway: &'p Pathway,
    arena: Vec<Instance<'a>>,
    matches: Vec<NaturalValue>,
}

impl<'a> Walk<'_, 'a> {
    fn descend(&mut self, index: usize, depth: usize) -> Result<()> {
        let pathway = self.pathway;
        let tokens = &pathway.tokens;
        let tag = &tokens[depth];
        if depth + 1 == tokens.len() {
            return self.leaf(index, tag);
        }
        let children = self.expand(index, tag)?;
        for child in children {
            self.descend(child, depth + 1)?;
        }
        Ok(())
    }

    /// Push the items of sequence `tag` under instance `index`.
    fn expand(&mut self, index: usize, tag: &Tag) -> Result<Range<usize>> {
        let dataset = self.arena[index].dataset;
        let nested = sequence_items(dataset, tag)?;
        let start = self.arena.len();
        let siblings = start..start + nested.len();
        self.arena.extend(nested.iter().map(|dataset| Instance {
            dataset,
            parent: Some(index),
            siblings: siblings.clone(),
        }));
        Ok(siblings)
    }

    fn leaf(&mut self, index: usize, tag: &Tag) -> Result<()> {
        let pathway = self.pathway;
        let dataset = self.arena[index].dataset;
        let Some(item) = dataset.get(tag) else {
            return Ok(());
        };
        let value = read_value(dataset, item)?;
        if value.is_null() {
            return Ok(());
        }

        let value = match &pathway.conditional {
            None => Some(value),
            Some(conditional) => self.apply(conditional, index, value)?,
        };
        let Some(value) = value else {
            tracing::trace!(pathway = %pathway, tag = %tag, "Branch rejected by conditional");
            return Ok(());
        };

        let resolved = match value {
            NaturalValue::Array(values) if values.len() > 1 => {
                if !pathway.join_values {
                    return Err(PathwayError::Multiplicity {
                        pathway: pathway.text.clone(),
                        count: values.len(),
                    });
                }
                let joined = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\\");
                NaturalValue::Scalar(Scalar::String(joined))
            }
            other => other,
        };
        if !resolved.is_null() {
            tracing::debug!(pathway = %pathway, tag = %tag, "Pathway branch matched");
            self.matches.push(resolved);
        }
        Ok(())
    }

    /// Filter a leaf value through the conditional; `None` drops the branch.
    fn apply(
        &self,
        conditional: &Conditional,
        index: usize,
        value: NaturalValue,
    ) -> Result<Option<NaturalValue>> {
        let accepted = match conditional.relation() {
            Relation::Leaf => flatten(&value).is_some_and(|text| conditional.is_match(&text)),
            Relation::EachValue => {
                let kept: Vec<Scalar> = match value {
                    NaturalValue::Scalar(scalar) => vec![scalar],
                    NaturalValue::Array(values) => values,
                    other => {
                        let accepted = flatten(&other).is_some_and(|text| conditional.is_match(&text));
                        return Ok(accepted.then_some(other));
                    }
                };
                let kept: Vec<Scalar> = kept
                    .into_iter()
                    .filter(|scalar| conditional.is_match(&scalar.to_string()))
                    .collect();
                return Ok(Some(NaturalValue::collapse(kept)).filter(|v| !v.is_null()));
            }
            Relation::Ancestor(levels) => {
                let mut holder = index;
                for _ in 1..levels {
                    match self.arena[holder].parent {
                        Some(parent) => holder = parent,
                        None => break,
                    }
                }
                conditional.test(self.arena[holder].dataset)?
            }
            Relation::Siblings => {
                let mut any = false;
                for sibling in self.arena[index].siblings.clone() {
                    if conditional.test(self.arena[sibling].dataset)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };
        Ok(accepted.then_some(value))
    }
}

/// Nested datasets of sequence `tag`; absent or empty sequences have none.
pub(crate) fn sequence_items<'a>(dataset: &'a Dataset, tag: &Tag) -> Result<&'a [Dataset]> {
    let Some(item) = dataset.get(tag) else {
        return Ok(&[]);
    };
    match item.value() {
        Value::Sequence(items) => Ok(items),
        Value::Empty => Ok(&[]),
        _ => Err(dtt_codec::ValueError::NotSequence {
            tag: item.tag().clone(),
            vr: item.vr(),
        }
        .into()),
    }
}
