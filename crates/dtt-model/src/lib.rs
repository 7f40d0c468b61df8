//! In-memory model for DICOM metadata records.
//!
//! This crate provides the types every other crate in the workspace builds on:
//!
//! - [`Tag`]: a `(group, element)` attribute identifier, optionally qualified by
//!   a private creator
//! - [`Vr`]: the closed set of value representations
//! - [`Multiplicity`]: the allowed repeat-count range of an attribute
//! - [`Value`] and [`Item`]: the raw payload of one attribute, as produced by a
//!   file parser
//! - [`Dataset`]: an ordered, tag-unique collection of items
//!
//! # Example
//!
//! ```
//! use dtt_model::{Dataset, Item, Tag, Value, Vr};
//!
//! let mut ds = Dataset::new();
//! ds.insert(Item::text(Tag::new(0x0010, 0x0010), Vr::PN, "Doe^John").unwrap());
//! ds.insert(Item::new(Tag::new(0x0028, 0x0010), Vr::US, Value::U16(vec![512])).unwrap());
//!
//! assert_eq!(ds.len(), 2);
//! assert_eq!(ds.get(&Tag::new(0x0028, 0x0010)).unwrap().count(), 1);
//! ```

mod dataset;
mod error;
mod multiplicity;
mod tag;
mod value;
mod vr;

pub use dataset::Dataset;
pub use error::{ModelError, Result};
pub use multiplicity::Multiplicity;
pub use tag::{PIXEL_DATA, Tag};
pub use value::{Item, Value};
pub use vr::Vr;
