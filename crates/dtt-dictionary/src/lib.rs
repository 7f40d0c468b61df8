//! Embedded DICOM data dictionary.
//!
//! Maps tags to keywords, allowed value representations and multiplicity,
//! resolves repeating-group masks such as `(60xx,3000)`, and resolves private
//! tags through their registered creator.
//!
//! # Example
//!
//! ```
//! use dtt_dictionary::Dictionary;
//! use dtt_model::{Tag, Vr};
//!
//! let dict = Dictionary::standard();
//! let entry = dict.by_keyword("PatientName").unwrap();
//! assert_eq!(entry.single_vr(), Some(Vr::PN));
//! assert_eq!(dict.by_tag(&Tag::new(0x0010, 0x0010)).keyword, "PatientName");
//! ```

mod dictionary;
mod embedded;
mod entry;
mod error;

pub use dictionary::{Dictionary, PrivateCreator};
pub use entry::{DictionaryEntry, TagPattern};
pub use error::{DictionaryError, Result};
