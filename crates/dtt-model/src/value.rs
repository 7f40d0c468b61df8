//! Raw attribute payloads and items.

use crate::dataset::Dataset;
use crate::error::{ModelError, Result};
use crate::{Tag, Vr};

/// Raw payload of an attribute, as stored by the file parser.
///
/// Text is kept exactly as stored, with multiple values separated by `\`.
/// Binary representations (OB, OD, OF, OL, OV, OW, UN) keep their bytes
/// undecoded, or carry a reference to bulk data held elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (zero length).
    Empty,
    /// Character data for the string representations.
    Text(String),
    /// Attribute tags (AT).
    Tags(Vec<Tag>),
    /// Signed shorts (SS).
    I16(Vec<i16>),
    /// Unsigned shorts (US).
    U16(Vec<u16>),
    /// Signed longs (SL).
    I32(Vec<i32>),
    /// Unsigned longs (UL).
    U32(Vec<u32>),
    /// Signed very longs (SV).
    I64(Vec<i64>),
    /// Unsigned very longs (UV).
    U64(Vec<u64>),
    /// Single precision floats (FL).
    F32(Vec<f32>),
    /// Double precision floats (FD).
    F64(Vec<f64>),
    /// Opaque bytes for the binary representations.
    Bytes(Vec<u8>),
    /// External reference to bulk data of a binary representation.
    BulkDataUri(String),
    /// Nested datasets (SQ).
    Sequence(Vec<Dataset>),
}

impl Value {
    /// Short name of the payload kind, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Text(_) => "text",
            Value::Tags(_) => "tag",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Bytes(_) => "bytes",
            Value::BulkDataUri(_) => "bulk data reference",
            Value::Sequence(_) => "sequence",
        }
    }

    /// Whether this payload may be stored under `vr`.
    #[must_use]
    pub fn fits(&self, vr: Vr) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(_) => vr.is_string(),
            Value::Tags(_) => vr == Vr::AT,
            Value::I16(_) => vr == Vr::SS,
            Value::U16(_) => vr == Vr::US,
            Value::I32(_) => vr == Vr::SL,
            Value::U32(_) => vr == Vr::UL,
            Value::I64(_) => vr == Vr::SV,
            Value::U64(_) => vr == Vr::UV,
            Value::F32(_) => vr == Vr::FL,
            Value::F64(_) => vr == Vr::FD,
            Value::Bytes(_) | Value::BulkDataUri(_) => vr.is_binary(),
            Value::Sequence(_) => vr == Vr::SQ,
        }
    }
}

/// One attribute of a dataset: tag, value representation and raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    tag: Tag,
    vr: Vr,
    value: Value,
}

impl Item {
    /// Create an item, rejecting payloads that do not fit the representation.
    pub fn new(tag: Tag, vr: Vr, value: Value) -> Result<Self> {
        if !value.fits(vr) {
            return Err(ModelError::ValueMismatch {
                tag,
                vr,
                payload: value.kind_name(),
            });
        }
        Ok(Self { tag, vr, value })
    }

    /// Create a present-but-empty item.
    #[must_use]
    pub fn empty(tag: Tag, vr: Vr) -> Self {
        Self {
            tag,
            vr,
            value: Value::Empty,
        }
    }

    /// Create a text item.
    pub fn text(tag: Tag, vr: Vr, text: impl Into<String>) -> Result<Self> {
        Self::new(tag, vr, Value::Text(text.into()))
    }

    /// Create a text item from several values, joined with `\`.
    pub fn texts<I, S>(tag: Tag, vr: Vr, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\\");
        Self::text(tag, vr, joined)
    }

    /// Create a sequence item.
    #[must_use]
    pub fn sequence(tag: Tag, datasets: Vec<Dataset>) -> Self {
        Self {
            tag,
            vr: Vr::SQ,
            value: Value::Sequence(datasets),
        }
    }

    /// The attribute tag.
    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// The value representation.
    #[must_use]
    pub fn vr(&self) -> Vr {
        self.vr
    }

    /// The raw payload.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to nested datasets, if this is a sequence.
    pub fn sequence_mut(&mut self) -> Option<&mut Vec<Dataset>> {
        match &mut self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Consume the item, returning its payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Bind a private creator to the tag.
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.tag.creator = Some(creator.into());
    }

    /// Text payload split into its stored values.
    ///
    /// Returns an empty list for non-text or empty items. Single valued text
    /// representations are never split.
    #[must_use]
    pub fn strings(&self) -> Vec<&str> {
        match &self.value {
            Value::Text(text) if text.is_empty() => Vec::new(),
            Value::Text(text) if self.vr.is_multi_valued_text() => text.split('\\').collect(),
            Value::Text(text) => vec![text.as_str()],
            _ => Vec::new(),
        }
    }

    /// Number of values stored.
    #[must_use]
    pub fn count(&self) -> usize {
        match &self.value {
            Value::Empty => 0,
            Value::Text(_) => self.strings().len(),
            Value::Tags(values) => values.len(),
            Value::I16(values) => values.len(),
            Value::U16(values) => values.len(),
            Value::I32(values) => values.len(),
            Value::U32(values) => values.len(),
            Value::I64(values) => values.len(),
            Value::U64(values) => values.len(),
            Value::F32(values) => values.len(),
            Value::F64(values) => values.len(),
            Value::Bytes(bytes) => usize::from(!bytes.is_empty()),
            Value::BulkDataUri(_) => 1,
            Value::Sequence(items) => items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_payload() {
        let err = Item::new(Tag::new(0x0028, 0x0010), Vr::US, Value::I16(vec![1])).unwrap_err();
        assert!(matches!(err, ModelError::ValueMismatch { vr: Vr::US, .. }));
        assert!(Item::text(Tag::new(0x0028, 0x0010), Vr::US, "1").is_err());
    }

    #[test]
    fn test_count_of_text() {
        let tag = Tag::new(0x0008, 0x0008);
        assert_eq!(Item::text(tag.clone(), Vr::CS, "").unwrap().count(), 0);
        assert_eq!(Item::text(tag.clone(), Vr::CS, "ORIGINAL").unwrap().count(), 1);
        assert_eq!(
            Item::text(tag, Vr::CS, "ORIGINAL\\PRIMARY\\AXIAL")
                .unwrap()
                .count(),
            3
        );
    }

    #[test]
    fn test_single_valued_text_is_not_split() {
        let item = Item::text(Tag::new(0x0040, 0xA160), Vr::UT, "a\\b").unwrap();
        assert_eq!(item.strings(), vec!["a\\b"]);
        assert_eq!(item.count(), 1);
    }

    #[test]
    fn test_texts_joins_values() {
        let item = Item::texts(Tag::new(0x0028, 0x0030), Vr::DS, ["0.5", "0.5"]).unwrap();
        assert_eq!(item.value(), &Value::Text("0.5\\0.5".to_string()));
    }

    #[test]
    fn test_bulk_reference_fits_binary_only() {
        let uri = Value::BulkDataUri("file:///pixels.raw".to_string());
        assert!(uri.fits(Vr::OB));
        assert!(!uri.fits(Vr::LO));
    }
}
