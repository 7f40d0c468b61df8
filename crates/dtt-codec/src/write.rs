//! Natural value to item.

use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Item, Tag, Value, Vr};

use crate::error::{Result, ValueError};
use crate::natural::{NaturalValue, Scalar, SequenceItem};
use crate::read::{parse_decimal, parse_integer};
use crate::temporal::{
    format_date, format_datetime, format_time, parse_date, parse_datetime, parse_time,
};

/// Largest integer an `f64` holds exactly.
const F64_EXACT: i128 = 1 << 53;

/// Store `value` under `tag`, choosing the representation from the
/// dictionary.
///
/// The first allowed representation whose payload matches the value type
/// exactly wins. Failing that, the first one the value converts to without
/// loss is used.
pub fn write_value(
    dict: &Dictionary,
    dataset: &mut Dataset,
    tag: Tag,
    value: &NaturalValue,
) -> Result<()> {
    let vrs = dict.by_tag(&tag).vrs.clone();
    let item = match value {
        NaturalValue::Null => Item::empty(tag, vrs.first().copied().unwrap_or(Vr::UN)),
        NaturalValue::Array(values) if values.is_empty() => {
            Item::empty(tag, vrs.first().copied().unwrap_or(Vr::UN))
        }
        NaturalValue::Sequence(items) => {
            if !vrs.contains(&Vr::SQ) {
                return Err(ValueError::UnsupportedValue {
                    tag,
                    kind: value.kind_name(),
                });
            }
            Item::sequence(tag, build_datasets(dict, items)?)
        }
        NaturalValue::Scalar(_) | NaturalValue::Array(_) => {
            let scalars = value.scalars();
            let chosen = vrs
                .iter()
                .find_map(|&vr| encode(vr, scalars, true).map(|payload| (vr, payload)))
                .or_else(|| {
                    vrs.iter()
                        .find_map(|&vr| encode(vr, scalars, false).map(|payload| (vr, payload)))
                });
            let Some((vr, payload)) = chosen else {
                return Err(ValueError::UnsupportedValue {
                    tag,
                    kind: value.kind_name(),
                });
            };
            Item::new(tag, vr, payload)?
        }
    };
    dataset.insert(item);
    Ok(())
}

/// Store `value` under `tag` with an explicit representation.
pub fn write_value_with_vr(
    dict: &Dictionary,
    dataset: &mut Dataset,
    tag: Tag,
    vr: Vr,
    value: &NaturalValue,
) -> Result<()> {
    let item = match value {
        NaturalValue::Null => Item::empty(tag, vr),
        NaturalValue::Array(values) if values.is_empty() => Item::empty(tag, vr),
        NaturalValue::Sequence(items) if vr == Vr::SQ => {
            Item::sequence(tag, build_datasets(dict, items)?)
        }
        NaturalValue::Sequence(_) => {
            return Err(ValueError::UnsupportedValue {
                tag,
                kind: value.kind_name(),
            });
        }
        NaturalValue::Scalar(_) | NaturalValue::Array(_) => {
            let scalars = value.scalars();
            let Some(payload) = encode(vr, scalars, false) else {
                return Err(ValueError::UnsupportedValue {
                    tag,
                    kind: value.kind_name(),
                });
            };
            Item::new(tag, vr, payload)?
        }
    };
    dataset.insert(item);
    Ok(())
}

fn build_datasets(dict: &Dictionary, items: &[SequenceItem]) -> Result<Vec<Dataset>> {
    items
        .iter()
        .map(|item| {
            let mut nested = Dataset::new();
            for (tag, value) in item {
                write_value(dict, &mut nested, tag.clone(), value)?;
            }
            Ok(nested)
        })
        .collect()
}

/// Payload for `scalars` under `vr`; `exact` admits only the natural type
/// of the representation.
fn encode(vr: Vr, scalars: &[Scalar], exact: bool) -> Option<Value> {
    if vr.is_string() {
        if scalars.len() > 1 && !vr.is_multi_valued_text() {
            return None;
        }
        let parts = scalars
            .iter()
            .map(|scalar| text_for(vr, scalar, exact))
            .collect::<Option<Vec<_>>>()?;
        return Some(Value::Text(parts.join("\\")));
    }

    match vr {
        Vr::AT => scalars
            .iter()
            .map(|scalar| match scalar {
                Scalar::Tag(tag) => Some(tag.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::Tags),
        Vr::SS => integers(scalars, exact, |s| matches!(s, Scalar::I16(_))).map(Value::I16),
        Vr::US => integers(scalars, exact, |s| matches!(s, Scalar::U16(_))).map(Value::U16),
        Vr::SL => integers(scalars, exact, |s| matches!(s, Scalar::I32(_))).map(Value::I32),
        Vr::UL => integers(scalars, exact, |s| matches!(s, Scalar::U32(_))).map(Value::U32),
        Vr::SV => integers(scalars, exact, |s| matches!(s, Scalar::I64(_))).map(Value::I64),
        Vr::UV => integers(scalars, exact, |s| matches!(s, Scalar::U64(_))).map(Value::U64),
        Vr::FL => scalars
            .iter()
            .map(|scalar| match scalar {
                Scalar::F32(v) => Some(*v),
                #[allow(clippy::cast_possible_truncation)]
                Scalar::F64(v) if !exact && f64::from(*v as f32) == *v => Some(*v as f32),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::F32),
        Vr::FD => scalars
            .iter()
            .map(|scalar| match scalar {
                Scalar::F64(v) => Some(*v),
                Scalar::F32(v) if !exact => Some(f64::from(*v)),
                #[allow(clippy::cast_precision_loss)]
                other if !exact && other.is_integer() => other
                    .as_i128()
                    .filter(|v| v.abs() <= F64_EXACT)
                    .map(|v| v as f64),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::F64),
        Vr::SQ => None,
        // binary representations
        _ => match scalars {
            [Scalar::Bytes(bytes)] => Some(Value::Bytes(bytes.clone())),
            [Scalar::Uri(uri)] => Some(Value::BulkDataUri(uri.clone())),
            _ => None,
        },
    }
}

fn integers<T>(scalars: &[Scalar], exact: bool, is_native: fn(&Scalar) -> bool) -> Option<Vec<T>>
where
    T: TryFrom<i128>,
{
    scalars
        .iter()
        .map(|scalar| {
            if exact && !is_native(scalar) {
                return None;
            }
            if !exact && !scalar.is_integer() && !matches!(scalar, Scalar::Decimal(_)) {
                return None;
            }
            scalar.as_i128().and_then(|v| T::try_from(v).ok())
        })
        .collect()
}

fn text_for(vr: Vr, scalar: &Scalar, exact: bool) -> Option<String> {
    let native = match (vr, scalar) {
        (Vr::DA, Scalar::Date(date)) => Some(format_date(*date)),
        (Vr::DT, Scalar::DateTime(datetime)) => Some(format_datetime(*datetime)),
        (Vr::TM, Scalar::Time(time)) => Some(format_time(*time)),
        (Vr::DS, Scalar::Decimal(decimal)) => Some(decimal.to_string()),
        (Vr::IS, Scalar::I32(v)) => Some(v.to_string()),
        (Vr::DA | Vr::DT | Vr::TM | Vr::DS | Vr::IS, _) => None,
        (_, Scalar::String(text)) => Some(text.clone()),
        _ => None,
    };
    if native.is_some() || exact {
        return native;
    }

    match (vr, scalar) {
        (Vr::DA, Scalar::String(s)) => parse_date(s.trim()).map(|_| s.clone()),
        (Vr::DT, Scalar::String(s)) => parse_datetime(s.trim()).map(|_| s.clone()),
        (Vr::DT, Scalar::Date(date)) => Some(format_date(*date)),
        (Vr::TM, Scalar::String(s)) => parse_time(s.trim()).map(|_| s.clone()),
        (Vr::DS, Scalar::String(s)) => parse_decimal(s).map(|_| s.clone()),
        (Vr::DS, other) if other.is_integer() => other.as_i128().map(|v| v.to_string()),
        (Vr::IS, Scalar::String(s)) => parse_integer(s).map(|_| s.clone()),
        (Vr::IS, other) => other
            .as_i128()
            .and_then(|v| i32::try_from(v).ok())
            .map(|v| v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn dict() -> &'static Dictionary {
        Dictionary::standard()
    }

    #[test]
    fn test_exact_type_picks_vr() {
        let mut ds = Dataset::new();
        let tag = Tag::new(0x0028, 0x0106);
        write_value(dict(), &mut ds, tag.clone(), &Scalar::I16(-5).into()).unwrap();
        assert_eq!(ds.get(&tag).unwrap().vr(), Vr::SS);
        write_value(dict(), &mut ds, tag.clone(), &Scalar::U16(5).into()).unwrap();
        assert_eq!(ds.get(&tag).unwrap().vr(), Vr::US);
    }

    #[test]
    fn test_compatible_conversion() {
        let mut ds = Dataset::new();
        let rows = Tag::new(0x0028, 0x0010);
        write_value(dict(), &mut ds, rows.clone(), &Scalar::I64(512).into()).unwrap();
        assert_eq!(ds.get(&rows).unwrap().value(), &Value::U16(vec![512]));

        let err = write_value(dict(), &mut ds, rows, &Scalar::I64(-1).into()).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedValue { kind: "i64", .. }));
    }

    #[test]
    fn test_time_writes_tm_text() {
        let mut ds = Dataset::new();
        let tag = Tag::new(0x0008, 0x0030);
        let time = NaiveTime::from_hms_micro_opt(9, 5, 7, 120).unwrap();
        write_value(dict(), &mut ds, tag.clone(), &Scalar::Time(time).into()).unwrap();
        assert_eq!(ds.get(&tag).unwrap().value(), &Value::Text("090507.000120".into()));
    }

    #[test]
    fn test_null_writes_empty_item() {
        let mut ds = Dataset::new();
        let tag = Tag::new(0x0028, 0x0106);
        write_value(dict(), &mut ds, tag.clone(), &NaturalValue::Null).unwrap();
        let item = ds.get(&tag).unwrap();
        assert_eq!(item.vr(), Vr::US);
        assert_eq!(item.count(), 0);
    }

    #[test]
    fn test_strings_validated_for_numeric_vrs() {
        let mut ds = Dataset::new();
        let tag = Tag::new(0x0018, 0x0050);
        write_value(dict(), &mut ds, tag.clone(), &"2.5".into()).unwrap();
        assert_eq!(ds.get(&tag).unwrap().value(), &Value::Text("2.5".into()));
        assert!(write_value(dict(), &mut ds, tag, &"thick".into()).is_err());
    }

    #[test]
    fn test_single_valued_text_rejects_arrays() {
        let mut ds = Dataset::new();
        let value = NaturalValue::Array(vec![Scalar::String("a".into()), Scalar::String("b".into())]);
        let err = write_value(dict(), &mut ds, Tag::new(0x0040, 0xA160), &value).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedValue { kind: "array", .. }));
    }

    #[test]
    fn test_sequence_requires_sq() {
        let mut ds = Dataset::new();
        let value = NaturalValue::Sequence(vec![SequenceItem::new()]);
        assert!(write_value(dict(), &mut ds, Tag::new(0x0010, 0x0010), &value).is_err());
        write_value(dict(), &mut ds, Tag::new(0x0040, 0xA730), &value).unwrap();
        assert_eq!(ds.get(&Tag::new(0x0040, 0xA730)).unwrap().count(), 1);
    }
}
