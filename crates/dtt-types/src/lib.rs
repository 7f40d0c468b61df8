//! Natural storage types for DICOM attributes.
//!
//! Maps a set of value representations and a multiplicity to a
//! [`TypeDescriptor`] a schema generator can turn into a column type, and
//! resolves [`TableTemplate`]s into typed [`ColumnRequest`]s.
//!
//! ```
//! use dtt_model::{Multiplicity, Vr};
//! use dtt_types::{NaturalKind, natural_type};
//!
//! let t = natural_type(&[Vr::US, Vr::SS], Multiplicity::ONE).unwrap();
//! assert_eq!(t.kind, NaturalKind::Int32);
//! ```

mod descriptor;
mod error;
mod template;

pub use descriptor::{
    NaturalKind, TypeDescriptor, conflate, descriptor_for_vr, natural_type,
    natural_type_for_codes, natural_type_for_tag,
};
pub use error::{Result, TypeError};
pub use template::{ColumnRequest, ColumnTemplate, TableTemplate};
