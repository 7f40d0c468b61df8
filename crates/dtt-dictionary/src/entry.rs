//! Dictionary entries and tag patterns.

use std::fmt;
use std::str::FromStr;

use dtt_model::{Multiplicity, Tag, Vr};

use crate::error::DictionaryError;

/// Tag or tag mask as written in the dictionary, e.g. `(0010,0010)`,
/// `(60xx,3000)` or, for private entries, `(0029,xx10)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagPattern {
    pub group: u16,
    pub group_mask: u16,
    pub element: u16,
    pub element_mask: u16,
}

impl TagPattern {
    /// Pattern matching exactly one tag.
    #[must_use]
    pub const fn exact(group: u16, element: u16) -> Self {
        Self {
            group,
            group_mask: 0xFFFF,
            element,
            element_mask: 0xFFFF,
        }
    }

    /// True when the pattern covers a repeating group or element range.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.group_mask != 0xFFFF || self.element_mask != 0xFFFF
    }

    /// Whether `tag` falls under this pattern.
    #[must_use]
    pub const fn matches(&self, tag: &Tag) -> bool {
        tag.group & self.group_mask == self.group && tag.element & self.element_mask == self.element
    }

    /// The lowest tag covered by the pattern.
    #[must_use]
    pub const fn base_tag(&self) -> Tag {
        Tag::new(self.group, self.element)
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})",
            masked_hex(self.group, self.group_mask),
            masked_hex(self.element, self.element_mask)
        )
    }
}

fn masked_hex(value: u16, mask: u16) -> String {
    format!("{value:04X}")
        .chars()
        .enumerate()
        .map(|(idx, ch)| {
            let nibble_mask = (mask >> (12 - idx * 4)) & 0xF;
            if nibble_mask == 0 { 'x' } else { ch }
        })
        .collect()
}

impl FromStr for TagPattern {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DictionaryError::InvalidToken {
            token: s.to_string(),
        };
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let (group, element) = inner.split_once(',').ok_or_else(invalid)?;
        let (group, group_mask) = parse_masked(group.trim()).ok_or_else(invalid)?;
        let (element, element_mask) = parse_masked(element.trim()).ok_or_else(invalid)?;
        Ok(Self {
            group,
            group_mask,
            element,
            element_mask,
        })
    }
}

fn parse_masked(text: &str) -> Option<(u16, u16)> {
    if text.len() != 4 {
        return None;
    }
    let mut value = 0u16;
    let mut mask = 0u16;
    for ch in text.chars() {
        value <<= 4;
        mask <<= 4;
        if ch.eq_ignore_ascii_case(&'x') {
            continue;
        }
        let nibble = ch.to_digit(16)?;
        value |= nibble as u16;
        mask |= 0xF;
    }
    Some((value, mask))
}

/// Immutable description of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    pub pattern: TagPattern,
    pub keyword: String,
    pub name: String,
    /// Allowed value representations, in dictionary order.
    pub vrs: Vec<Vr>,
    pub vm: Multiplicity,
    /// Owning private creator for private entries.
    pub creator: Option<String>,
}

impl DictionaryEntry {
    /// True when more than one representation is allowed, so the
    /// representation cannot be inferred from the tag alone.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.vrs.len() > 1
    }

    /// The only allowed representation, if the entry is unambiguous.
    #[must_use]
    pub fn single_vr(&self) -> Option<Vr> {
        match self.vrs.as_slice() {
            [vr] => Some(*vr),
            _ => None,
        }
    }

    /// Whether `vr` is one of the allowed representations.
    #[must_use]
    pub fn allows(&self, vr: Vr) -> bool {
        self.vrs.contains(&vr)
    }

    /// Whether the attribute may hold nested datasets.
    #[must_use]
    pub fn allows_sequence(&self) -> bool {
        self.allows(Vr::SQ)
    }

    /// Whether SQ is the only allowed representation.
    #[must_use]
    pub fn is_sequence_only(&self) -> bool {
        !self.vrs.is_empty() && self.vrs.iter().all(|vr| *vr == Vr::SQ)
    }

    /// True for repeating-group or range entries.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.pattern.is_masked()
    }
}

/// Parse a dictionary VR column such as `US or SS`.
pub(crate) fn parse_vrs(text: &str) -> Option<Vec<Vr>> {
    let vrs: Option<Vec<Vr>> = text
        .split(" or ")
        .map(|code| code.trim().parse().ok())
        .collect();
    vrs.filter(|vrs| !vrs.is_empty())
}
