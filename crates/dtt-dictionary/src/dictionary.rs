//! Dictionary loading and lookups.

use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::sync::LazyLock;

use dtt_model::{Multiplicity, Tag, Vr};
use serde::Deserialize;

use crate::embedded;
use crate::entry::{DictionaryEntry, TagPattern, parse_vrs};
use crate::error::{DictionaryError, Result};

static STANDARD: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::load_embedded().expect("embedded dictionary data is valid")
});

/// Handle returned when a private creator is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivateCreator {
    group: u16,
    name: String,
}

impl PrivateCreator {
    /// Group the creator was registered for.
    #[must_use]
    pub const fn group(&self) -> u16 {
        self.group
    }

    /// Creator identification string.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag of a data element owned by this creator.
    #[must_use]
    pub fn tag(&self, element: u16) -> Tag {
        Tag::private(self.group, element, self.name.clone())
    }
}

#[derive(Debug, Deserialize)]
struct StandardRow {
    #[serde(rename = "Tag")]
    tag: String,
    #[serde(rename = "VR")]
    vr: String,
    #[serde(rename = "VM")]
    vm: String,
    #[serde(rename = "Keyword")]
    keyword: String,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PrivateRow {
    #[serde(rename = "Creator")]
    creator: String,
    #[serde(rename = "Tag")]
    tag: String,
    #[serde(rename = "VR")]
    vr: String,
    #[serde(rename = "VM")]
    vm: String,
    #[serde(rename = "Keyword")]
    keyword: String,
    #[serde(rename = "Name")]
    name: String,
}

impl PrivateRow {
    fn split(self) -> (String, StandardRow) {
        let row = StandardRow {
            tag: self.tag,
            vr: self.vr,
            vm: self.vm,
            keyword: self.keyword,
            name: self.name,
        };
        (self.creator, row)
    }
}

/// Data dictionary: standard entries, repeating-group masks and private
/// entries keyed by creator.
///
/// Registration takes `&mut self`; share a built dictionary read-only
/// across threads.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    exact: HashMap<u32, usize>,
    masked: Vec<usize>,
    keywords: HashMap<String, usize>,
    private: HashMap<(String, u16, u8), usize>,
    /// Registered creators, by the group they reserve blocks in.
    creators: BTreeSet<(u16, String)>,
    creator_slot: DictionaryEntry,
    unknown: DictionaryEntry,
}

impl Dictionary {
    /// Shared dictionary built from the embedded data on first use.
    pub fn standard() -> &'static Dictionary {
        &STANDARD
    }

    /// Build a dictionary from the embedded CSV files.
    pub fn load_embedded() -> Result<Self> {
        Self::from_csv(embedded::STANDARD_DICTIONARY, embedded::PRIVATE_DICTIONARY)
    }

    /// Build a dictionary from standard and private CSV content.
    pub fn from_csv(standard: &str, private: &str) -> Result<Self> {
        let mut dict = Self::empty();

        for row in read_rows::<StandardRow>(standard, embedded::STANDARD_FILE)? {
            let entry = build_entry(row, None, embedded::STANDARD_FILE)?;
            dict.add_standard(entry);
        }

        for row in read_rows::<PrivateRow>(private, embedded::PRIVATE_FILE)? {
            let (creator, row) = row.split();
            if creator.is_empty() {
                return Err(DictionaryError::InvalidValue {
                    field: "Creator",
                    value: creator,
                    file: embedded::PRIVATE_FILE,
                });
            }
            let entry = build_entry(row, Some(creator), embedded::PRIVATE_FILE)?;
            dict.add_private(entry);
        }

        tracing::debug!(
            standard = dict.exact.len(),
            masked = dict.masked.len(),
            private = dict.private.len(),
            creators = dict.creators.len(),
            "Loaded data dictionary"
        );
        Ok(dict)
    }

    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            exact: HashMap::new(),
            masked: Vec::new(),
            keywords: HashMap::new(),
            private: HashMap::new(),
            creators: BTreeSet::new(),
            // odd group, element 0x0010..=0x00FF
            creator_slot: DictionaryEntry {
                pattern: TagPattern {
                    group: 0x0001,
                    group_mask: 0x0001,
                    element: 0x0000,
                    element_mask: 0xFF00,
                },
                keyword: "PrivateCreator".to_string(),
                name: "Private Creator".to_string(),
                vrs: vec![Vr::LO],
                vm: Multiplicity::ONE,
                creator: None,
            },
            unknown: DictionaryEntry {
                pattern: TagPattern {
                    group: 0,
                    group_mask: 0,
                    element: 0,
                    element_mask: 0,
                },
                keyword: "Unknown".to_string(),
                name: "Unknown".to_string(),
                vrs: vec![Vr::UN],
                vm: Multiplicity::ONE,
                creator: None,
            },
        }
    }

    fn add_standard(&mut self, entry: DictionaryEntry) {
        let index = self.entries.len();
        if let Some(previous) = self.keywords.insert(entry.keyword.clone(), index) {
            tracing::warn!(
                keyword = %entry.keyword,
                first = %self.entries[previous].pattern,
                second = %entry.pattern,
                "Duplicate dictionary keyword, keeping the later entry"
            );
        }
        if entry.is_masked() {
            self.masked.push(index);
        } else {
            self.exact.insert(entry.pattern.base_tag().key(), index);
        }
        self.entries.push(entry);
    }

    fn add_private(&mut self, entry: DictionaryEntry) {
        let Some(creator) = entry.creator.clone() else {
            return;
        };
        let index = self.entries.len();
        let key = (
            creator.clone(),
            entry.pattern.group,
            (entry.pattern.element & 0x00FF) as u8,
        );
        if self.private.insert(key, index).is_some() {
            tracing::warn!(
                creator = %creator,
                tag = %entry.pattern,
                "Duplicate private dictionary entry, keeping the later entry"
            );
        }
        self.creators.insert((entry.pattern.group, creator));
        self.entries.push(entry);
    }

    /// Number of standard, masked and private entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every loaded entry in load order.
    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    /// Look up a standard entry by keyword.
    #[must_use]
    pub fn by_keyword(&self, keyword: &str) -> Option<&DictionaryEntry> {
        self.keywords.get(keyword).map(|&index| &self.entries[index])
    }

    /// Look up the entry describing `tag`.
    ///
    /// Never fails: tags the dictionary knows nothing about resolve to the
    /// `Unknown` entry whose only representation is UN.
    #[must_use]
    pub fn by_tag(&self, tag: &Tag) -> &DictionaryEntry {
        if tag.is_private() {
            if tag.is_private_creator() {
                return &self.creator_slot;
            }
            if let Some(creator) = tag.creator.as_deref()
                && let Some(&index) = self.private.get(&(
                    creator.to_string(),
                    tag.group,
                    tag.private_offset(),
                ))
            {
                return &self.entries[index];
            }
            return &self.unknown;
        }

        if let Some(&index) = self.exact.get(&tag.key()) {
            return &self.entries[index];
        }
        self.masked
            .iter()
            .map(|&index| &self.entries[index])
            .find(|entry| entry.pattern.matches(tag))
            .unwrap_or(&self.unknown)
    }

    /// Register a private creator in `group` so tags it owns there can be
    /// resolved. A creator registered in one group does not resolve in another.
    ///
    /// Registering the same name twice is harmless.
    pub fn register_private_creator(&mut self, group: u16, name: &str) -> PrivateCreator {
        let name = name.trim_end_matches([' ', '\0']).trim_start().to_string();
        if self.creators.insert((group, name.clone())) {
            tracing::debug!(group = %format!("{group:04X}"), creator = %name, "Registered private creator");
        }
        PrivateCreator { group, name }
    }

    /// Whether `name` has been registered as a private creator in `group`.
    #[must_use]
    pub fn is_registered(&self, group: u16, name: &str) -> bool {
        self.creators.contains(&(group, name.to_string()))
    }

    /// Build the tag of a private element owned by `creator`.
    pub fn resolve_private_tag(&self, group: u16, element: u16, creator: &str) -> Result<Tag> {
        let tag = Tag::private(group, element, creator);
        if !self.is_registered(group, creator) {
            return Err(DictionaryError::creator_missing(tag, Some(creator)));
        }
        Ok(tag)
    }

    /// Resolve a keyword or tag text (`(0010,0010)`, `00100010`) to a tag.
    ///
    /// Masked entries resolve to the first tag of their range.
    pub fn resolve_token(&self, token: &str) -> Result<Tag> {
        let token = token.trim();
        if let Some(entry) = self.by_keyword(token) {
            return Ok(entry.pattern.base_tag());
        }
        if token.starts_with('(') || looks_like_hex_tag(token) {
            return token.parse().map_err(|_| DictionaryError::InvalidToken {
                token: token.to_string(),
            });
        }
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DictionaryError::InvalidToken {
                token: token.to_string(),
            });
        }
        Err(DictionaryError::unknown_keyword(token))
    }

    /// Whether `tag` resolves to a real entry rather than `Unknown`.
    #[must_use]
    pub fn contains_tag(&self, tag: &Tag) -> bool {
        !std::ptr::eq(self.by_tag(tag), &self.unknown)
    }

    /// Keyword for `tag`, or its tag text when the dictionary has none.
    #[must_use]
    pub fn keyword_for(&self, tag: &Tag) -> String {
        if self.contains_tag(tag) {
            self.by_tag(tag).keyword.clone()
        } else {
            tag.to_string()
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::standard().clone()
    }
}

fn looks_like_hex_tag(token: &str) -> bool {
    token.len() == 8 && token.chars().all(|c| c.is_ascii_hexdigit())
}

fn read_rows<T>(content: &str, file: &'static str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(content.as_bytes()));

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|e| DictionaryError::CsvParse {
                file,
                message: e.to_string(),
            })
        })
        .collect()
}

fn build_entry(
    row: StandardRow,
    creator: Option<String>,
    file: &'static str,
) -> Result<DictionaryEntry> {
    let pattern: TagPattern = row.tag.parse().map_err(|_| DictionaryError::InvalidValue {
        field: "Tag",
        value: row.tag.clone(),
        file,
    })?;
    let vrs = parse_vrs(&row.vr).ok_or_else(|| DictionaryError::InvalidValue {
        field: "VR",
        value: row.vr.clone(),
        file,
    })?;
    let vm: Multiplicity = row.vm.parse().map_err(|_| DictionaryError::InvalidValue {
        field: "VM",
        value: row.vm.clone(),
        file,
    })?;
    if row.keyword.is_empty() {
        return Err(DictionaryError::InvalidValue {
            field: "Keyword",
            value: row.keyword,
            file,
        });
    }
    Ok(DictionaryEntry {
        pattern,
        keyword: row.keyword,
        name: row.name,
        vrs,
        vm,
        creator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_CSV: &str = "Tag,VR,VM,Keyword,Name\n\
        \"(0010,0010)\",PN,1,PatientName,Patient's Name\n\
        \"(0028,0106)\",US or SS,1,SmallestImagePixelValue,Smallest Image Pixel Value\n\
        \"(60xx,3000)\",OB or OW,1,OverlayData,Overlay Data\n";

    const PRIVATE_CSV: &str = "Creator,Tag,VR,VM,Keyword,Name\n\
        ACME 1.1,\"(0029,xx10)\",OB,1,AcmeBlob,Acme Blob\n";

    fn small() -> Dictionary {
        Dictionary::from_csv(STANDARD_CSV, PRIVATE_CSV).unwrap()
    }

    #[test]
    fn test_exact_and_masked_lookup() {
        let dict = small();
        assert_eq!(dict.by_tag(&Tag::new(0x0010, 0x0010)).keyword, "PatientName");
        assert_eq!(dict.by_tag(&Tag::new(0x6004, 0x3000)).keyword, "OverlayData");
        assert_eq!(dict.by_tag(&Tag::new(0x0010, 0x9999)).keyword, "Unknown");
        assert_eq!(dict.by_tag(&Tag::new(0x0010, 0x9999)).vrs, vec![Vr::UN]);
    }

    #[test]
    fn test_private_lookup_needs_creator() {
        let dict = small();
        let bare = Tag::new(0x0029, 0x1010);
        assert_eq!(dict.by_tag(&bare).keyword, "Unknown");

        let owned = Tag::private(0x0029, 0x1110, "ACME 1.1");
        let entry = dict.by_tag(&owned);
        assert_eq!(entry.keyword, "AcmeBlob");
        assert_eq!(entry.creator.as_deref(), Some("ACME 1.1"));

        let slot = dict.by_tag(&Tag::new(0x0029, 0x0011));
        assert_eq!(slot.keyword, "PrivateCreator");
        assert_eq!(slot.single_vr(), Some(Vr::LO));
    }

    #[test]
    fn test_resolve_private_tag() {
        let mut dict = small();
        let tag = dict.resolve_private_tag(0x0029, 0x1010, "ACME 1.1").unwrap();
        assert_eq!(tag.creator.as_deref(), Some("ACME 1.1"));

        let err = dict.resolve_private_tag(0x0031, 0x1001, "OTHER").unwrap_err();
        assert!(matches!(err, DictionaryError::PrivateCreatorMissing { .. }));

        let creator = dict.register_private_creator(0x0031, "OTHER ");
        assert_eq!(creator.name(), "OTHER");
        assert_eq!(creator.tag(0x1001), Tag::private(0x0031, 0x1001, "OTHER"));
        assert!(dict.resolve_private_tag(0x0031, 0x1001, "OTHER").is_ok());
        // registering twice keeps one creator
        dict.register_private_creator(0x0031, "OTHER");
        assert!(dict.is_registered(0x0031, "OTHER"));
    }

    #[test]
    fn test_creator_is_scoped_to_its_group() {
        let mut dict = small();
        dict.register_private_creator(0x0029, "OTHER");
        assert!(dict.is_registered(0x0029, "OTHER"));
        assert!(!dict.is_registered(0x0019, "OTHER"));
        assert!(dict.resolve_private_tag(0x0029, 0x1001, "OTHER").is_ok());
        let err = dict.resolve_private_tag(0x0019, 0x1001, "OTHER").unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::PrivateCreatorMissing { ref tag, .. } if tag.group == 0x0019
        ));
        assert!(dict.resolve_private_tag(0x0031, 0x1001, "ACME 1.1").is_err());
    }

    #[test]
    fn test_resolve_token() {
        let dict = small();
        assert_eq!(dict.resolve_token("PatientName").unwrap(), Tag::new(0x0010, 0x0010));
        assert_eq!(dict.resolve_token("(0010,0010)").unwrap(), Tag::new(0x0010, 0x0010));
        assert_eq!(dict.resolve_token("00100010").unwrap(), Tag::new(0x0010, 0x0010));
        assert_eq!(dict.resolve_token("OverlayData").unwrap(), Tag::new(0x6000, 0x3000));
        assert!(matches!(
            dict.resolve_token("PatientNmae"),
            Err(DictionaryError::UnknownKeyword { .. })
        ));
        assert!(matches!(
            dict.resolve_token("(0010"),
            Err(DictionaryError::InvalidToken { .. })
        ));
        assert!(matches!(
            dict.resolve_token("a->b"),
            Err(DictionaryError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        let bad_vr = "Tag,VR,VM,Keyword,Name\n\"(0010,0010)\",XX,1,PatientName,Patient's Name\n";
        let err = Dictionary::from_csv(bad_vr, PRIVATE_CSV).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidValue { field: "VR", .. }));

        let bad_tag = "Tag,VR,VM,Keyword,Name\n(0010),PN,1,PatientName,Patient's Name\n";
        let err = Dictionary::from_csv(bad_tag, PRIVATE_CSV).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidValue { field: "Tag", .. }));

        let short = "Tag,VR,VM,Keyword,Name\n\"(0010,0010)\",PN\n";
        let err = Dictionary::from_csv(short, PRIVATE_CSV).unwrap_err();
        assert!(matches!(err, DictionaryError::CsvParse { .. }));
    }

    #[test]
    fn test_keyword_for_unknown_uses_tag_text() {
        let dict = small();
        assert_eq!(dict.keyword_for(&Tag::new(0x0010, 0x0010)), "PatientName");
        assert_eq!(dict.keyword_for(&Tag::new(0x0011, 0x1001)), "(0011,1001)");
        assert!(dict.contains_tag(&Tag::new(0x6002, 0x3000)));
        assert!(!dict.contains_tag(&Tag::new(0x0011, 0x1001)));
    }
}
