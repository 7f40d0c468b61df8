//! Command-level behaviour of the `dtt` tool.

use std::fs;
use std::path::PathBuf;

use dtt_cli::commands::{
    DocumentFormat, decode, encode, read_document, run_convert, run_query, template_rows,
    type_rows, type_table,
};
use dtt_dictionary::Dictionary;
use dtt_document::DocumentOptions;
use dtt_model::Tag;

const REPORT: &str = r#"{
    "PatientID": { "vr": "LO", "val": "P-001" },
    "ContentSequence": { "vr": "SQ", "val": [
        { "ValueType": { "vr": "CS", "val": "TEXT" }, "TextValue": { "vr": "UT", "val": "No acute findings" } },
        { "ValueType": { "vr": "CS", "val": "CODE" }, "TextValue": { "vr": "UT", "val": "Coded" } },
        { "ValueType": { "vr": "CS", "val": "TEXT" }, "TextValue": { "vr": "UT", "val": "Follow up in 6 months" } }
    ] }
}"#;

fn dict() -> &'static Dictionary {
    Dictionary::standard()
}

/// Write `contents` to a per-test file in the temp directory.
fn scratch(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dtt-cli-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn convert_json_to_bson_and_back() {
    let input = scratch("report.json", REPORT.as_bytes());
    let bson = run_convert(dict(), &input, DocumentFormat::Bson, DocumentOptions::new()).unwrap();
    let from_bson = decode(dict(), DocumentFormat::Bson, &bson, DocumentOptions::new()).unwrap();
    let from_json = read_document(dict(), &input, DocumentOptions::new()).unwrap();
    assert_eq!(from_bson, from_json);
    assert!(from_json.contains(&Tag::new(0x0040, 0xA730)));

    let json = encode(dict(), DocumentFormat::Json, &from_bson, DocumentOptions::new()).unwrap();
    let again = decode(dict(), DocumentFormat::Json, &json, DocumentOptions::new()).unwrap();
    assert_eq!(again, from_json);
}

#[test]
fn unknown_extension_is_rejected() {
    let input = scratch("report.txt", REPORT.as_bytes());
    let err = read_document(dict(), &input, DocumentOptions::new()).unwrap_err();
    assert!(err.to_string().contains("report.txt"));
}

#[test]
fn query_with_conditional() {
    let input = scratch("query.json", REPORT.as_bytes());
    let dataset = read_document(dict(), &input, DocumentOptions::new()).unwrap();

    let all = run_query(dict(), &dataset, "ContentSequence->TextValue+", None).unwrap();
    assert_eq!(
        all.as_deref(),
        Some("No acute findings\nCoded\nFollow up in 6 months")
    );

    let text_only = run_query(
        dict(),
        &dataset,
        "ContentSequence->TextValue+",
        Some(("..->ValueType", "^TEXT$")),
    )
    .unwrap();
    assert_eq!(
        text_only.as_deref(),
        Some("No acute findings\nFollow up in 6 months")
    );

    let nothing = run_query(
        dict(),
        &dataset,
        "ContentSequence->TextValue",
        Some(("..->ValueType", "^NUM$")),
    )
    .unwrap();
    assert_eq!(nothing, None);

    assert!(run_query(dict(), &dataset, "ContentSequence->TextValue", None).is_err());
}

#[test]
fn keyword_types() {
    let keywords = ["PatientName", "Rows", "ImageType"].map(String::from);
    let rows = type_rows(dict(), &keywords).unwrap();
    insta::assert_debug_snapshot!(rows, @r#"
    [
        TypeRow {
            name: "PatientName",
            tag: "(0010,0010)",
            vr: "PN",
            vm: "1",
            natural: "String(324)",
            nullable: None,
        },
        TypeRow {
            name: "Rows",
            tag: "(0028,0010)",
            vr: "US",
            vm: "1",
            natural: "UInt16",
            nullable: None,
        },
        TypeRow {
            name: "ImageType",
            tag: "(0008,0008)",
            vr: "CS",
            vm: "2-n",
            natural: "String",
            nullable: None,
        },
    ]
    "#);
    assert!(type_rows(dict(), &["PatientNmae".to_string()]).is_err());
}

#[test]
fn template_types() {
    let template = r#"{
        "name": "series",
        "columns": [
            { "name": "SeriesInstanceUID", "is_primary_key": true },
            { "name": "Modality", "allow_nulls": false },
            { "name": "SliceThickness" }
        ]
    }"#;
    let rows = template_rows(dict(), template).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].nullable, Some(false));
    assert_eq!(rows[2].natural, "Decimal(19,19)");
    assert_eq!(rows[2].nullable, Some(true));

    let rendered = type_table(&rows).to_string();
    assert!(rendered.contains("Nullable"));
    assert!(rendered.contains("SeriesInstanceUID"));
}
