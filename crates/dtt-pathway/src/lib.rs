//! Pathway queries: pull a value out of arbitrarily nested sequences.
//!
//! A pathway such as `ContentSequence->ConceptNameCodeSequence->CodeMeaning`
//! expands each sequence in turn and reads the final attribute from every
//! item reached. A [`Conditional`] can restrict which of those leaves count,
//! testing the leaf itself, the item holding it or that item's siblings.
//!
//! ```
//! use dtt_codec::{NaturalValue, Scalar};
//! use dtt_dictionary::Dictionary;
//! use dtt_model::{Dataset, Item, Tag, Vr};
//! use dtt_pathway::Pathway;
//!
//! let dict = Dictionary::standard();
//! let nested: Dataset = [Item::text(Tag::new(0x0040, 0xA160), Vr::UT, "Normal").unwrap()]
//!     .into_iter()
//!     .collect();
//! let mut ds = Dataset::new();
//! ds.insert(Item::sequence(Tag::new(0x0040, 0xA730), vec![nested]));
//!
//! let pathway = Pathway::parse(dict, "ContentSequence->TextValue").unwrap();
//! assert_eq!(
//!     pathway.evaluate(&ds).unwrap(),
//!     NaturalValue::Scalar(Scalar::String("Normal".into()))
//! );
//! ```

mod conditional;
mod error;
mod pathway;
mod request;

pub use conditional::{Conditional, Relation};
pub use error::{PathwayError, Result};
pub use pathway::{Pathway, SEPARATOR};
pub use request::{ConditionalRequest, ElevationRequest};
