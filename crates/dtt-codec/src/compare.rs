//! Value equality between datasets.

use dtt_model::{Dataset, Item, Value, Vr};

use crate::read::{parse_decimal, parse_integer};

/// Whether two datasets hold equal values under equal tags.
///
/// Text compares without value padding, DS and IS compare numerically, floats
/// compare bit for bit, and sequences compare recursively.
#[must_use]
pub fn value_eq(left: &Dataset, right: &Dataset) -> bool {
    differences(left, right).is_empty()
}

/// Describe every difference between two datasets, one line each.
#[must_use]
pub fn differences(left: &Dataset, right: &Dataset) -> Vec<String> {
    let mut out = Vec::new();
    collect(left, right, "", &mut out);
    out
}

fn collect(left: &Dataset, right: &Dataset, path: &str, out: &mut Vec<String>) {
    for item in left {
        let tag = item.tag();
        let here = format!("{path}{tag}");
        let Some(other) = right.get(tag) else {
            out.push(format!("{here}: missing on the right"));
            continue;
        };
        if item.vr() != other.vr() {
            out.push(format!("{here}: VR {} != {}", item.vr(), other.vr()));
            continue;
        }
        if tag.creator != other.tag().creator {
            out.push(format!(
                "{here}: creator {:?} != {:?}",
                tag.creator,
                other.tag().creator
            ));
        }
        match (item.value(), other.value()) {
            (Value::Sequence(a), Value::Sequence(b)) => {
                if a.len() != b.len() {
                    out.push(format!("{here}: {} items != {}", a.len(), b.len()));
                    continue;
                }
                for (index, (a, b)) in a.iter().zip(b).enumerate() {
                    collect(a, b, &format!("{here}[{index}]."), out);
                }
            }
            _ if !items_equal(item, other) => {
                out.push(format!("{here}: {:?} != {:?}", item.value(), other.value()));
            }
            _ => {}
        }
    }
    for item in right {
        if !left.contains(item.tag()) {
            out.push(format!("{path}{}: missing on the left", item.tag()));
        }
    }
}

fn items_equal(left: &Item, right: &Item) -> bool {
    if left.count() == 0 && right.count() == 0 {
        return true;
    }
    match (left.value(), right.value()) {
        (Value::Text(_) | Value::Empty, Value::Text(_) | Value::Empty) => {
            texts_equal(left.vr(), &left.strings(), &right.strings())
        }
        (Value::F32(a), Value::F32(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        }
        (Value::F64(a), Value::F64(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        }
        (a, b) => a == b,
    }
}

fn texts_equal(vr: Vr, left: &[&str], right: &[&str]) -> bool {
    let blank = |parts: &[&str]| parts.iter().all(|p| p.trim_matches([' ', '\0']).is_empty());
    if blank(left) && blank(right) {
        return true;
    }
    left.len() == right.len()
        && left.iter().zip(right).all(|(a, b)| {
            let a = a.trim_matches([' ', '\0']);
            let b = b.trim_matches([' ', '\0']);
            match vr {
                Vr::DS => match (parse_decimal(a), parse_decimal(b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => a == b,
                },
                Vr::IS => match (parse_integer(a), parse_integer(b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => a.trim_start_matches(['+', '0']) == b.trim_start_matches(['+', '0']),
                },
                _ => a == b,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtt_model::Tag;

    fn with(item: Item) -> Dataset {
        [item].into_iter().collect()
    }

    #[test]
    fn test_padding_and_numeric_text() {
        let tag = Tag::new(0x0018, 0x0050);
        let a = with(Item::text(tag.clone(), Vr::DS, " 0000012.").unwrap());
        let b = with(Item::text(tag, Vr::DS, "12.0").unwrap());
        assert!(value_eq(&a, &b));

        let tag = Tag::new(0x0010, 0x0010);
        let a = with(Item::text(tag.clone(), Vr::PN, "Doe ").unwrap());
        let b = with(Item::text(tag, Vr::PN, "Doe").unwrap());
        assert!(value_eq(&a, &b));
    }

    #[test]
    fn test_nan_equals_itself() {
        let tag = Tag::new(0x0018, 0x9087);
        let a = with(Item::new(tag, Vr::FD, Value::F64(vec![f64::NAN])).unwrap());
        assert!(value_eq(&a, &a.clone()));
    }

    #[test]
    fn test_differences_name_the_path() {
        let inner = |text: &str| -> Dataset {
            with(Item::text(Tag::new(0x0040, 0xA160), Vr::UT, text).unwrap())
        };
        let seq = Tag::new(0x0040, 0xA730);
        let a = with(Item::sequence(seq.clone(), vec![inner("a"), inner("b")]));
        let b = with(Item::sequence(seq, vec![inner("a"), inner("c")]));
        let diffs = differences(&a, &b);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].starts_with("(0040,A730)[1].(0040,A160)"), "{diffs:?}");
    }

    #[test]
    fn test_missing_items_reported_both_ways() {
        let a = with(Item::text(Tag::new(0x0008, 0x0060), Vr::CS, "MR").unwrap());
        let b = with(Item::text(Tag::new(0x0008, 0x0070), Vr::LO, "ACME").unwrap());
        let diffs = differences(&a, &b);
        assert_eq!(diffs.len(), 2);
    }
}
