//! Conversion between DICOM items and natural values.
//!
//! Reading maps each item to a [`NaturalValue`]: null, a scalar, an array or,
//! for sequences, one map per nested dataset. Writing goes the other way,
//! choosing the item's representation from the dictionary.
//!
//! ```
//! use dtt_codec::{NaturalValue, Scalar, read_value, write_value};
//! use dtt_dictionary::Dictionary;
//! use dtt_model::{Dataset, Tag};
//!
//! let dict = Dictionary::standard();
//! let mut ds = Dataset::new();
//! let rows = Tag::new(0x0028, 0x0010);
//! write_value(dict, &mut ds, rows.clone(), &Scalar::U16(512).into()).unwrap();
//!
//! let item = ds.get(&rows).unwrap();
//! assert_eq!(read_value(&ds, item).unwrap(), NaturalValue::Scalar(Scalar::U16(512)));
//! ```

mod compare;
mod error;
mod natural;
mod numeric;
mod read;
mod temporal;
mod write;

pub use compare::{differences, value_eq};
pub use error::{Result, ValueError};
pub use natural::{NaturalValue, Scalar, SequenceItem, flatten, flatten_with};
pub use numeric::fix_numeric_string;
pub use read::{expand_sequence, read_dataset, read_value};
pub use temporal::{
    format_date, format_datetime, format_time, parse_date, parse_datetime, parse_time,
};
pub use write::{write_value, write_value_with_vr};
