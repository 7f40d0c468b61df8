//! Attribute tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Pixel Data (7FE0,0010), the bulk attribute the value codec never materialises.
pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

/// Attribute identifier.
///
/// A tag in a private block (odd group) is only meaningful together with the
/// private creator that reserved the block; two tags with the same numbers but
/// different creators are different attributes.
///
/// | Form | Example |
/// |------|---------|
/// | Standard | `(0010,0010)` |
/// | Private with creator | `(0029,1010:SIEMENS CSA HEADER)` |
/// | Compact hex | `00100010` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
    /// Resolved private creator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl Tag {
    /// Create an unqualified tag.
    #[must_use]
    pub const fn new(group: u16, element: u16) -> Self {
        Self {
            group,
            element,
            creator: None,
        }
    }

    /// Create a tag qualified by a private creator.
    #[must_use]
    pub fn private(group: u16, element: u16, creator: impl Into<String>) -> Self {
        Self {
            group,
            element,
            creator: Some(creator.into()),
        }
    }

    /// Bind a private creator to this tag.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Numeric key, `group << 16 | element`.
    #[must_use]
    pub const fn key(&self) -> u32 {
        ((self.group as u32) << 16) | self.element as u32
    }

    /// True when the tag lies in a private (odd) group.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.group % 2 == 1 && !matches!(self.group, 0x0001 | 0x0003 | 0x0005 | 0x0007 | 0xFFFF)
    }

    /// True for the slots that hold a private creator string, `(gggg,0010-00FF)`.
    #[must_use]
    pub const fn is_private_creator(&self) -> bool {
        self.is_private() && self.element >= 0x0010 && self.element <= 0x00FF
    }

    /// True for group length pseudo-attributes `(gggg,0000)`.
    #[must_use]
    pub const fn is_group_length(&self) -> bool {
        self.element == 0
    }

    /// The creator slot reserving this private data element, `(gggg,00xx)`.
    ///
    /// Returns `None` for standard tags and for the creator slots themselves.
    #[must_use]
    pub const fn creator_slot(&self) -> Option<Tag> {
        if self.is_private() && self.element >> 8 != 0 {
            Some(Tag::new(self.group, self.element >> 8))
        } else {
            None
        }
    }

    /// Low byte of a private data element, the offset inside its block.
    #[must_use]
    pub const fn private_offset(&self) -> u8 {
        (self.element & 0x00FF) as u8
    }

    /// Compact upper-case hex form without punctuation, `ggggeeee`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("{:04X}{:04X}", self.group, self.element)
    }

    /// True when both tags share the numeric pair, ignoring creators.
    #[must_use]
    pub const fn same_numbers(&self, other: &Tag) -> bool {
        self.group == other.group && self.element == other.element
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.creator {
            Some(creator) => write!(
                f,
                "({:04X},{:04X}:{})",
                self.group, self.element, creator
            ),
            None => write!(f, "({:04X},{:04X})", self.group, self.element),
        }
    }
}

impl FromStr for Tag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let (numbers, creator) = match inner.split_once(':') {
            Some((numbers, creator)) => (numbers, Some(creator.trim())),
            None => (inner, None),
        };

        let (group, element) = match numbers.split_once(',') {
            Some((group, element)) => (group.trim(), element.trim()),
            None if numbers.len() == 8 && numbers.is_char_boundary(4) => numbers.split_at(4),
            None => return Err(ModelError::invalid_tag(s)),
        };

        let group = parse_hex_u16(group).ok_or_else(|| ModelError::invalid_tag(s))?;
        let element = parse_hex_u16(element).ok_or_else(|| ModelError::invalid_tag(s))?;

        Ok(match creator {
            Some(creator) if !creator.is_empty() => Tag::private(group, element, creator),
            _ => Tag::new(group, element),
        })
    }
}

fn parse_hex_u16(text: &str) -> Option<u16> {
    if text.len() != 4 {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}
