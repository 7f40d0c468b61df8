//! Document keys, representation wrapping and private creator checks.
//!
//! A key is the attribute keyword, or `(gggg,eeee)-Keyword` when the keyword
//! alone does not identify the tag or its representation: private tags
//! (`(gggg,eeee:CREATOR)-Keyword` once a creator is known), ambiguous
//! entries, repeating-group masks and tags missing from the dictionary.

use dtt_dictionary::{Dictionary, DictionaryError};
use dtt_model::{Dataset, Item, Tag, Vr};

use crate::error::{DocumentError, Result};

/// How one item is keyed in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemKey {
    pub key: String,
    /// The value must carry its representation in a `{vr, val}` wrapper.
    pub wrap: bool,
}

/// Key for `item`, resolving private creators against `dataset`.
pub(crate) fn encode_key(dict: &Dictionary, dataset: &Dataset, item: &Item) -> Result<ItemKey> {
    let mut tag = item.tag().clone();
    if tag.creator.is_none() && tag.creator_slot().is_some() {
        let creator = dataset
            .creator_for(&tag)
            .ok_or_else(|| DictionaryError::creator_missing(tag.clone(), None))?
            .to_string();
        tag = tag.with_creator(creator);
    }

    let entry = dict.by_tag(&tag);
    let qualified = tag.is_private()
        || entry.is_ambiguous()
        || entry.is_masked()
        || !dict.contains_tag(&tag);
    let key = if qualified {
        format!("{tag}-{}", entry.keyword)
    } else {
        entry.keyword.clone()
    };
    let wrap = tag.is_private() || entry.is_ambiguous() || entry.single_vr() != Some(item.vr());
    Ok(ItemKey { key, wrap })
}

/// Tag named by a document key.
///
/// A creator embedded in the key must be registered with the dictionary.
pub(crate) fn decode_key(dict: &Dictionary, key: &str) -> Result<Tag> {
    if key.starts_with('(') {
        let text = key.rfind(")-").map_or(key, |end| &key[..=end]);
        let tag: Tag = text.parse().map_err(|_| DocumentError::InvalidKey {
            key: key.to_string(),
        })?;
        return match tag.creator.as_deref() {
            Some(_) if !tag.is_private() => Err(DocumentError::InvalidKey {
                key: key.to_string(),
            }),
            Some(creator) => Ok(dict.resolve_private_tag(tag.group, tag.element, creator)?),
            None => Ok(tag),
        };
    }
    dict.by_keyword(key)
        .map(|entry| entry.pattern.base_tag())
        .ok_or_else(|| DictionaryError::unknown_keyword(key).into())
}

/// Representation of a decoded value: the explicit `vr` if given, otherwise
/// the dictionary's only allowed representation.
pub(crate) fn resolve_vr(
    dict: &Dictionary,
    key: &str,
    tag: &Tag,
    explicit: Option<&str>,
) -> Result<Vr> {
    if let Some(code) = explicit {
        return Ok(code.parse()?);
    }
    let entry = dict.by_tag(tag);
    match entry.single_vr() {
        Some(vr) if !tag.is_private() => Ok(vr),
        _ => Err(DocumentError::MissingVr {
            key: key.to_string(),
            allowed: entry
                .vrs
                .iter()
                .map(|vr| vr.code())
                .collect::<Vec<_>>()
                .join(" or "),
        }),
    }
}

/// Bind private creators from their sibling slots, then require every
/// private data element to have a registered creator.
pub(crate) fn finish_decoded(dict: &Dictionary, dataset: &mut Dataset) -> Result<()> {
    let linked = dataset.link_private_creators();
    if linked > 0 {
        tracing::trace!(linked, "Linked private creators after decoding");
    }
    check_creators(dict, dataset)
}

fn check_creators(dict: &Dictionary, dataset: &Dataset) -> Result<()> {
    for item in dataset {
        let tag = item.tag();
        if tag.creator_slot().is_some() {
            match tag.creator.as_deref() {
                None => return Err(DictionaryError::creator_missing(tag.clone(), None).into()),
                Some(creator) if !dict.is_registered(tag.group, creator) => {
                    return Err(DictionaryError::creator_missing(tag.clone(), Some(creator)).into());
                }
                Some(_) => {}
            }
        }
        if let dtt_model::Value::Sequence(nested) = item.value() {
            for dataset in nested {
                check_creators(dict, dataset)?;
            }
        }
    }
    Ok(())
}
