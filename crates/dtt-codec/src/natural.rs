//! Natural values: the scalar, array and nested forms of an item.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dtt_dictionary::Dictionary;
use dtt_model::Tag;

use crate::temporal::{format_date, format_datetime, format_time};

/// One nested dataset in flattened form.
pub type SequenceItem = BTreeMap<Tag, NaturalValue>;

/// A single value in its natural type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Decimal(BigDecimal),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Tag(Tag),
    Bytes(Vec<u8>),
    /// Reference to binary content held outside the dataset.
    Uri(String),
}

impl Scalar {
    /// Short name of the value type, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
            Self::Decimal(_) => "decimal",
            Self::I16(_) => "i16",
            Self::U16(_) => "u16",
            Self::I32(_) => "i32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Tag(_) => "tag",
            Self::Bytes(_) => "bytes",
            Self::Uri(_) => "uri",
        }
    }

    /// Integer value, including decimals without a fractional part.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I16(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::Decimal(d) if d.with_scale(0) == *d => d.to_i128(),
            _ => None,
        }
    }

    /// Whether this is one of the integer variants.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I16(_) | Self::U16(_) | Self::I32(_) | Self::U32(_) | Self::I64(_) | Self::U64(_)
        )
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Date(d) => f.write_str(&format_date(*d)),
            Self::DateTime(dt) => f.write_str(&format_datetime(*dt)),
            Self::Time(t) => f.write_str(&format_time(*t)),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Tag(tag) => f.write_str(&tag.hex()),
            Self::Bytes(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::Uri(uri) => f.write_str(uri),
        }
    }
}

/// Natural form of an item.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NaturalValue {
    /// No value.
    #[default]
    Null,
    /// Exactly one value.
    Scalar(Scalar),
    /// Two or more values.
    Array(Vec<Scalar>),
    /// Nested datasets, one map per item.
    Sequence(Vec<SequenceItem>),
}

impl NaturalValue {
    /// Collapse stored values: none is null, one is a scalar, more are an array.
    #[must_use]
    pub fn collapse(mut values: Vec<Scalar>) -> Self {
        match values.len() {
            0 => Self::Null,
            1 => values.pop().map_or(Self::Null, Self::Scalar),
            _ => Self::Array(values),
        }
    }

    /// Whether the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value type, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(scalar) => scalar.kind_name(),
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
        }
    }

    /// The scalar values held, empty for null and sequences.
    #[must_use]
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            Self::Scalar(scalar) => std::slice::from_ref(scalar),
            Self::Array(values) => values,
            Self::Null | Self::Sequence(_) => &[],
        }
    }
}

impl From<Scalar> for NaturalValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<&str> for NaturalValue {
    fn from(text: &str) -> Self {
        Self::Scalar(Scalar::String(text.to_string()))
    }
}

impl From<String> for NaturalValue {
    fn from(text: String) -> Self {
        Self::Scalar(Scalar::String(text))
    }
}

impl From<Vec<Scalar>> for NaturalValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::collapse(values)
    }
}

/// Render a value as one string using the shared dictionary for keywords.
///
/// See [`flatten_with`].
#[must_use]
pub fn flatten(value: &NaturalValue) -> Option<String> {
    flatten_with(Dictionary::standard(), value)
}

/// Render a value as one string.
///
/// Arrays are joined with `\`. Sequences become an indented
/// `Keyword: value` listing, one block per item. Null renders as `None`.
#[must_use]
pub fn flatten_with(dict: &Dictionary, value: &NaturalValue) -> Option<String> {
    match value {
        NaturalValue::Null => None,
        NaturalValue::Scalar(scalar) => Some(scalar.to_string()),
        NaturalValue::Array(values) => Some(
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\\"),
        ),
        NaturalValue::Sequence(items) => {
            let mut out = String::new();
            write_items(dict, items, 0, &mut out);
            Some(out.trim_end().to_string())
        }
    }
}

fn write_items(dict: &Dictionary, items: &[SequenceItem], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (index, item) in items.iter().enumerate() {
        out.push_str(&format!("{indent}[{index}]\n"));
        for (tag, value) in item {
            let keyword = dict.keyword_for(tag);
            match value {
                NaturalValue::Sequence(nested) => {
                    out.push_str(&format!("{indent}  {keyword}:\n"));
                    write_items(dict, nested, depth + 2, out);
                }
                other => {
                    let text = flatten_with(dict, other).unwrap_or_default();
                    out.push_str(&format!("{indent}  {keyword}: {text}\n"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse() {
        assert_eq!(NaturalValue::collapse(vec![]), NaturalValue::Null);
        assert_eq!(
            NaturalValue::collapse(vec![Scalar::U16(1)]),
            NaturalValue::Scalar(Scalar::U16(1))
        );
        assert!(matches!(
            NaturalValue::collapse(vec![Scalar::U16(1), Scalar::U16(2)]),
            NaturalValue::Array(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn test_flatten_scalars_and_arrays() {
        assert_eq!(flatten(&NaturalValue::Null), None);
        assert_eq!(flatten(&"abc".into()).as_deref(), Some("abc"));
        let array = NaturalValue::Array(vec![
            Scalar::String("abcd".into()),
            Scalar::String("efgh".into()),
        ]);
        assert_eq!(flatten(&array).as_deref(), Some("abcd\\efgh"));
        let tag = NaturalValue::Scalar(Scalar::Tag(Tag::new(0x0010, 0x0010)));
        assert_eq!(flatten(&tag).as_deref(), Some("00100010"));
    }

    #[test]
    fn test_flatten_sequence_listing() {
        let mut item = SequenceItem::new();
        item.insert(Tag::new(0x0040, 0xA160), "Finding".into());
        item.insert(Tag::new(0x0040, 0xA040), "TEXT".into());
        let text = flatten(&NaturalValue::Sequence(vec![item])).unwrap();
        assert_eq!(text, "[0]\n  ValueType: TEXT\n  TextValue: Finding");
    }

    #[test]
    fn test_integer_view() {
        assert_eq!(Scalar::U64(7).as_i128(), Some(7));
        assert_eq!(Scalar::Decimal("12.0".parse().unwrap()).as_i128(), Some(12));
        assert_eq!(Scalar::Decimal("12.5".parse().unwrap()).as_i128(), None);
        assert_eq!(Scalar::F64(1.0).as_i128(), None);
    }
}
