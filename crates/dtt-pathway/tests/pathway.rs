//! Pathway evaluation over nested content.

use dtt_codec::{NaturalValue, Scalar};
use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Item, Tag, Value, Vr};
use dtt_pathway::{Conditional, ElevationRequest, Pathway, PathwayError};
use proptest::prelude::*;

const CONTENT_SEQUENCE: Tag = Tag::new(0x0040, 0xA730);
const TEXT_VALUE: Tag = Tag::new(0x0040, 0xA160);
const VALUE_TYPE: Tag = Tag::new(0x0040, 0xA040);
const PALETTE_SEQUENCE: Tag = Tag::new(0x0028, 0x0145);
const TEXT_STRING: Tag = Tag::new(0x2030, 0x0020);

fn dict() -> &'static Dictionary {
    Dictionary::standard()
}

fn string(text: &str) -> NaturalValue {
    NaturalValue::Scalar(Scalar::String(text.to_string()))
}

fn content_item(value_type: &str, text: &str) -> Dataset {
    [
        Item::text(VALUE_TYPE, Vr::CS, value_type).unwrap(),
        Item::text(TEXT_VALUE, Vr::UT, text).unwrap(),
    ]
    .into_iter()
    .collect()
}

fn report(items: Vec<Dataset>) -> Dataset {
    [Item::sequence(CONTENT_SEQUENCE, items)].into_iter().collect()
}

fn five_findings() -> Dataset {
    report(
        (1..=5)
            .map(|n| content_item("TEXT", &format!("Finding {n}")))
            .collect(),
    )
}

fn palette(values: &str) -> Dataset {
    let nested: Dataset = [Item::text(TEXT_STRING, Vr::LO, values).unwrap()]
        .into_iter()
        .collect();
    [Item::sequence(PALETTE_SEQUENCE, vec![nested])].into_iter().collect()
}

#[test]
fn branches_join_with_plus() {
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue+").unwrap();
    assert_eq!(
        pathway.evaluate(&five_findings()).unwrap(),
        string("Finding 1\nFinding 2\nFinding 3\nFinding 4\nFinding 5")
    );
}

#[test]
fn branches_without_plus_are_ambiguous() {
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue").unwrap();
    let err = pathway.evaluate(&five_findings()).unwrap_err();
    assert!(matches!(err, PathwayError::Ambiguous { branches: 5, .. }));
    assert!(err.is_aggregation());
}

#[test]
fn multiple_values_need_ampersand() {
    let dataset = palette("abcd\\efgh");
    let plain = Pathway::parse(dict(), "PseudoColorPaletteInstanceReferenceSequence->TextString").unwrap();
    assert!(matches!(
        plain.evaluate(&dataset),
        Err(PathwayError::Multiplicity { count: 2, .. })
    ));

    let joined =
        Pathway::parse(dict(), "PseudoColorPaletteInstanceReferenceSequence->TextString&").unwrap();
    assert_eq!(joined.evaluate(&dataset).unwrap(), string("abcd\\efgh"));
}

#[test]
fn single_leaf_keeps_natural_type() {
    let nested: Dataset = [Item::new(Tag::new(0x0028, 0x0010), Vr::US, Value::U16(vec![512])).unwrap()]
        .into_iter()
        .collect();
    let dataset: Dataset = [Item::sequence(CONTENT_SEQUENCE, vec![nested])].into_iter().collect();
    let pathway = Pathway::parse(dict(), "ContentSequence->Rows").unwrap();
    assert_eq!(
        pathway.evaluate(&dataset).unwrap(),
        NaturalValue::Scalar(Scalar::U16(512))
    );
}

#[test]
fn missing_leaves_and_blank_values_are_skipped() {
    let dataset = report(vec![
        content_item("TEXT", "Only finding"),
        [Item::text(VALUE_TYPE, Vr::CS, "CODE").unwrap()].into_iter().collect(),
        content_item("TEXT", "   "),
    ]);
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue").unwrap();
    assert_eq!(pathway.evaluate(&dataset).unwrap(), string("Only finding"));
}

#[test]
fn parent_conditional_selects_items() {
    let dataset = report(vec![
        content_item("CODE", "Ignored"),
        content_item("TEXT", "Kept"),
        content_item("NUM", "Also ignored"),
    ]);
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue")
        .unwrap()
        .with_conditional(Conditional::parse(dict(), "..->ValueType", "^TEXT$").unwrap());
    assert_eq!(pathway.evaluate(&dataset).unwrap(), string("Kept"));
}

#[test]
fn grandparent_conditional_climbs() {
    let container = |value_type: &str, text: &str| -> Dataset {
        [
            Item::text(VALUE_TYPE, Vr::CS, value_type).unwrap(),
            Item::sequence(CONTENT_SEQUENCE, vec![content_item("TEXT", text)]),
        ]
        .into_iter()
        .collect()
    };
    let dataset = report(vec![container("CONTAINER", "Inside"), container("CODE", "Elsewhere")]);
    let pathway = Pathway::parse(dict(), "ContentSequence->ContentSequence->TextValue")
        .unwrap()
        .with_conditional(Conditional::parse(dict(), "..->..->ValueType", "CONTAINER").unwrap());
    assert_eq!(pathway.evaluate(&dataset).unwrap(), string("Inside"));
}

#[test]
fn sibling_conditional_sees_whole_expansion() {
    let with_container = report(vec![
        content_item("TEXT", "First"),
        content_item("CONTAINER", "Second"),
    ]);
    let without = report(vec![content_item("TEXT", "First"), content_item("TEXT", "Second")]);
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue+")
        .unwrap()
        .with_conditional(Conditional::parse(dict(), "[..]->ValueType", "^CONTAINER$").unwrap());

    assert_eq!(pathway.evaluate(&with_container).unwrap(), string("First\nSecond"));
    assert_eq!(pathway.evaluate(&without).unwrap(), NaturalValue::Null);
}

#[test]
fn leaf_conditional_tests_flattened_value() {
    let pathway = Pathway::parse(dict(), "PseudoColorPaletteInstanceReferenceSequence->TextString&")
        .unwrap()
        .with_conditional(Conditional::parse(dict(), ".", "cd\\\\ef").unwrap());
    assert_eq!(pathway.evaluate(&palette("abcd\\efgh")).unwrap(), string("abcd\\efgh"));
    assert_eq!(pathway.evaluate(&palette("wxyz")).unwrap(), NaturalValue::Null);
}

#[test]
fn each_value_conditional_filters_before_multiplicity() {
    let pathway = Pathway::parse(dict(), "PseudoColorPaletteInstanceReferenceSequence->TextString")
        .unwrap()
        .with_conditional(Conditional::parse(dict(), "[]", "^ef").unwrap());
    assert_eq!(pathway.evaluate(&palette("abcd\\efgh")).unwrap(), string("efgh"));
    assert_eq!(pathway.evaluate(&palette("abcd\\xyz")).unwrap(), NaturalValue::Null);
}

#[test]
fn intermediate_attribute_must_hold_items() {
    let dataset: Dataset = [Item::new(CONTENT_SEQUENCE, Vr::UN, Value::Bytes(vec![1])).unwrap()]
        .into_iter()
        .collect();
    let pathway = Pathway::parse(dict(), "ContentSequence->TextValue").unwrap();
    assert!(matches!(pathway.evaluate(&dataset), Err(PathwayError::Value(_))));
}

#[test]
fn elevation_request_round_trip() {
    let request = ElevationRequest::new("finding", "ContentSequence->TextValue+")
        .with_conditional("..->ValueType", "^TEXT$");
    let json = serde_json::to_string(&request).unwrap();
    let back: ElevationRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);

    let pathway = back.compile(dict()).unwrap();
    let dataset = report(vec![content_item("TEXT", "A"), content_item("CODE", "B"), content_item("TEXT", "C")]);
    assert_eq!(pathway.evaluate(&dataset).unwrap(), string("A\nC"));
}

proptest! {
    #[test]
    fn joined_branches_keep_order(texts in prop::collection::vec("[A-Za-z][A-Za-z ]{0,10}[A-Za-z]", 2..8)) {
        let dataset = report(texts.iter().map(|text| content_item("TEXT", text)).collect());
        let pathway = Pathway::parse(dict(), "ContentSequence->TextValue+").unwrap();
        prop_assert_eq!(pathway.evaluate(&dataset).unwrap(), string(&texts.join("\n")));
    }
}
