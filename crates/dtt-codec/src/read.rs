//! Item to natural value.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use dtt_model::{Dataset, Item, PIXEL_DATA, Tag, Value, Vr};

use crate::error::{Result, ValueError};
use crate::natural::{NaturalValue, Scalar, SequenceItem};
use crate::numeric::fix_numeric_string;
use crate::temporal::{parse_date, parse_datetime, parse_time};

/// Read an item of `dataset` as its natural value.
///
/// The dataset must be non-empty and hold the item. Pixel Data always reads
/// as null.
pub fn read_value(dataset: &Dataset, item: &Item) -> Result<NaturalValue> {
    if dataset.is_empty() {
        return Err(ValueError::invalid_argument("dataset is empty"));
    }
    if !dataset.contains(item.tag()) {
        return Err(ValueError::invalid_argument(format!(
            "dataset does not contain {}",
            item.tag()
        )));
    }
    read_item(item)
}

/// Read every item of `dataset` into a map.
pub fn read_dataset(dataset: &Dataset) -> Result<SequenceItem> {
    dataset
        .iter()
        .map(|item| Ok((item.tag().clone(), read_item(item)?)))
        .collect()
}

/// Expand the sequence stored under `tag` into one map per nested dataset.
///
/// An absent attribute expands to nothing.
pub fn expand_sequence(dataset: &Dataset, tag: &Tag) -> Result<Vec<SequenceItem>> {
    let Some(item) = dataset.get(tag) else {
        return Ok(Vec::new());
    };
    match item.value() {
        Value::Sequence(items) => items.iter().map(read_dataset).collect(),
        Value::Empty if item.vr() == Vr::SQ => Ok(Vec::new()),
        _ => Err(ValueError::NotSequence {
            tag: item.tag().clone(),
            vr: item.vr(),
        }),
    }
}

fn read_item(item: &Item) -> Result<NaturalValue> {
    if item.tag().same_numbers(&PIXEL_DATA) {
        return Ok(NaturalValue::Null);
    }
    let tag = item.tag();
    let vr = item.vr();

    let values = match item.value() {
        Value::Empty => return Ok(NaturalValue::Null),
        Value::Sequence(items) if items.is_empty() => return Ok(NaturalValue::Null),
        Value::Sequence(items) => {
            let maps = items.iter().map(read_dataset).collect::<Result<Vec<_>>>()?;
            return Ok(NaturalValue::Sequence(maps));
        }
        Value::Text(_) => read_text(item)?,
        Value::Tags(tags) => tags.iter().cloned().map(Scalar::Tag).collect(),
        Value::I16(v) => v.iter().copied().map(Scalar::I16).collect(),
        Value::U16(v) => v.iter().copied().map(Scalar::U16).collect(),
        Value::I32(v) => v.iter().copied().map(Scalar::I32).collect(),
        Value::U32(v) => v.iter().copied().map(Scalar::U32).collect(),
        Value::I64(v) => v.iter().copied().map(Scalar::I64).collect(),
        Value::U64(v) => v.iter().copied().map(Scalar::U64).collect(),
        Value::F32(v) => v.iter().copied().map(Scalar::F32).collect(),
        Value::F64(v) => v.iter().copied().map(Scalar::F64).collect(),
        Value::Bytes(bytes) if bytes.is_empty() => Vec::new(),
        Value::Bytes(bytes) => vec![Scalar::Bytes(bytes.clone())],
        Value::BulkDataUri(uri) => vec![Scalar::Uri(uri.clone())],
    };
    tracing::trace!(tag = %tag, vr = %vr, count = values.len(), "Read item");
    Ok(NaturalValue::collapse(values))
}

fn read_text(item: &Item) -> Result<Vec<Scalar>> {
    let tag = item.tag();
    let vr = item.vr();
    let parts: Vec<&str> = item
        .strings()
        .into_iter()
        .map(|part| trim_padding(vr, part))
        .collect();
    if parts.iter().all(|part| part.is_empty()) {
        return Ok(Vec::new());
    }

    match vr {
        Vr::DA => parse_each(tag, vr, &parts, |s| parse_date(s).map(Scalar::Date)),
        Vr::DT => parse_each(tag, vr, &parts, |s| parse_datetime(s).map(Scalar::DateTime)),
        Vr::TM => parse_each(tag, vr, &parts, |s| parse_time(s).map(Scalar::Time)),
        Vr::DS => parse_each(tag, vr, &parts, |s| parse_decimal(s).map(Scalar::Decimal)),
        Vr::IS => parse_each(tag, vr, &parts, |s| parse_integer(s).map(Scalar::I32)),
        _ => Ok(parts
            .into_iter()
            .map(|part| Scalar::String(part.to_string()))
            .collect()),
    }
}

/// Strip value padding: trailing spaces and NULs everywhere, leading spaces
/// too except for the free text representations.
fn trim_padding(vr: Vr, text: &str) -> &str {
    let text = text.trim_end_matches([' ', '\0']);
    match vr {
        Vr::LT | Vr::ST | Vr::UT | Vr::UR => text,
        _ => text.trim_start_matches(' '),
    }
}

/// Parse every part. A blank part among non-blank ones has no natural
/// value to hold its position, so the whole item is a format error.
fn parse_each<F>(tag: &Tag, vr: Vr, parts: &[&str], parse: F) -> Result<Vec<Scalar>>
where
    F: Fn(&str) -> Option<Scalar>,
{
    if parts.iter().any(|part| part.is_empty()) {
        return Err(ValueError::format(tag, vr, parts.join("\\")));
    }
    parts
        .iter()
        .map(|part| parse(part).ok_or_else(|| ValueError::format(tag, vr, *part)))
        .collect()
}

/// Parse DS text, accepting the numeric-string fix-ups and exponents.
pub(crate) fn parse_decimal(text: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(&fix_numeric_string(text)).ok()
}

/// Parse IS text as a signed 32-bit integer.
pub(crate) fn parse_integer(text: &str) -> Option<i32> {
    fix_numeric_string(text).parse().ok()
}
