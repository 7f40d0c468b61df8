//! Integration tests against the embedded dictionary.

use dtt_dictionary::{Dictionary, DictionaryError};
use dtt_model::{Tag, Vr};
use proptest::prelude::*;

#[test]
fn sequence_entries_allow_nothing_else() {
    let dict = Dictionary::standard();
    let offenders: Vec<String> = dict
        .entries()
        .filter(|entry| entry.allows_sequence() && !entry.is_sequence_only())
        .map(|entry| entry.keyword.clone())
        .collect();
    assert!(offenders.is_empty(), "mixed SQ entries: {offenders:?}");
}

#[test]
fn every_vr_is_represented() {
    let dict = Dictionary::standard();
    for vr in Vr::ALL {
        assert!(
            dict.entries().any(|entry| entry.allows(vr)),
            "no entry allows {vr}"
        );
    }
}

#[test]
fn ambiguous_entries_are_flagged() {
    let dict = Dictionary::standard();
    let smallest = dict.by_keyword("SmallestImagePixelValue").unwrap();
    assert!(smallest.is_ambiguous());
    assert_eq!(smallest.vrs, vec![Vr::US, Vr::SS]);

    let pixel = dict.by_tag(&Tag::new(0x7FE0, 0x0010));
    assert_eq!(pixel.vrs, vec![Vr::OB, Vr::OW]);
    assert!(!dict.by_keyword("PatientName").unwrap().is_ambiguous());
}

#[test]
fn repeating_groups_resolve_through_masks() {
    let dict = Dictionary::standard();
    for group in [0x6000u16, 0x6002, 0x601E] {
        let entry = dict.by_tag(&Tag::new(group, 0x3000));
        assert_eq!(entry.keyword, "OverlayData");
        assert!(entry.is_masked());
    }
    assert_eq!(dict.resolve_token("OverlayRows").unwrap(), Tag::new(0x6000, 0x0010));
}

#[test]
fn embedded_private_creators_are_registered() {
    let dict = Dictionary::standard();
    assert!(dict.is_registered(0x0029, "SIEMENS CSA HEADER"));
    assert!(dict.is_registered(0x0009, "GEMS_IDEN_01"));
    assert!(!dict.is_registered(0x0019, "SIEMENS CSA HEADER"));

    let tag = dict
        .resolve_private_tag(0x0029, 0x1010, "SIEMENS CSA HEADER")
        .unwrap();
    let entry = dict.by_tag(&tag);
    assert_eq!(entry.keyword, "CSAImageHeaderInfo");
    assert_eq!(entry.single_vr(), Some(Vr::OB));

    let err = dict.resolve_private_tag(0x0029, 0x1010, "NOBODY").unwrap_err();
    assert!(matches!(
        err,
        DictionaryError::PrivateCreatorMissing { creator: Some(ref name), .. } if name == "NOBODY"
    ));
}

#[test]
fn group_length_entry_is_present() {
    let dict = Dictionary::standard();
    let entry = dict.by_tag(&Tag::new(0x0002, 0x0000));
    assert_eq!(entry.keyword, "FileMetaInformationGroupLength");
}

proptest! {
    #[test]
    fn keywords_resolve_to_their_entry(index in 0usize..150) {
        let dict = Dictionary::standard();
        let entries: Vec<_> = dict.entries().filter(|e| e.creator.is_none()).collect();
        let entry = entries[index % entries.len()];
        let tag = dict.resolve_token(&entry.keyword).unwrap();
        prop_assert_eq!(&dict.by_tag(&tag).keyword, &entry.keyword);
        prop_assert_eq!(dict.resolve_token(&tag.to_string()).unwrap(), tag);
    }

    #[test]
    fn unknown_private_data_never_panics(group in (0x0009u16..0x7FFF).prop_map(|g| g | 1), element in 0x1000u16..=0xFFFF) {
        let dict = Dictionary::standard();
        let entry = dict.by_tag(&Tag::new(group, element));
        prop_assert_eq!(entry.single_vr(), Some(Vr::UN));
    }
}
