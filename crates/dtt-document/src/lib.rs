//! BSON and JSON tree documents for DICOM datasets.
//!
//! Both codecs key attributes by keyword and fall back to
//! `(gggg,eeee)-Keyword` keys when the keyword alone cannot say which tag or
//! representation was meant. Decoding links private creators and rejects
//! private data elements whose creator is not registered.
//!
//! ```
//! use dtt_dictionary::Dictionary;
//! use dtt_document::{DocumentOptions, from_json_str, to_json_string};
//! use dtt_model::{Dataset, Item, Tag, Vr};
//!
//! let dict = Dictionary::standard();
//! let mut ds = Dataset::new();
//! ds.insert(Item::text(Tag::new(0x0010, 0x0010), Vr::PN, "Doe^John").unwrap());
//!
//! let text = to_json_string(dict, &ds, DocumentOptions::new()).unwrap();
//! assert_eq!(from_json_str(dict, &text, DocumentOptions::new()).unwrap(), ds);
//! ```

mod bson_codec;
mod codec;
mod error;
mod json_codec;
mod keys;
mod numeric;
mod options;

use dtt_dictionary::Dictionary;
use dtt_model::Dataset;

pub use bson_codec::BsonCodec;
pub use codec::TreeCodec;
pub use error::{DocumentError, Result};
pub use json_codec::JsonCodec;
pub use options::{DocumentOptions, JsonMode};

/// Encode a dataset as BSON bytes.
pub fn to_bson_bytes(dict: &Dictionary, dataset: &Dataset, options: DocumentOptions) -> Result<Vec<u8>> {
    BsonCodec::new(dict, options).to_bytes(dataset)
}

/// Decode a dataset from BSON bytes.
pub fn from_bson_bytes(dict: &Dictionary, bytes: &[u8], options: DocumentOptions) -> Result<Dataset> {
    BsonCodec::new(dict, options).from_bytes(bytes)
}

/// Encode a dataset as JSON text.
pub fn to_json_string(dict: &Dictionary, dataset: &Dataset, options: DocumentOptions) -> Result<String> {
    JsonCodec::new(dict, options).to_text(dataset)
}

/// Decode a dataset from JSON text.
pub fn from_json_str(dict: &Dictionary, text: &str, options: DocumentOptions) -> Result<Dataset> {
    JsonCodec::new(dict, options).from_text(text)
}
