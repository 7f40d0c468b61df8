//! Embedded dictionary data.
//!
//! Both dictionaries are embedded at compile time using `include_str!()`, so
//! lookups never depend on runtime file I/O.

/// Standard data dictionary (`Tag,VR,VM,Keyword,Name`).
pub const STANDARD_DICTIONARY: &str = include_str!("../data/standard.csv");

/// Private data dictionary (`Creator,Tag,VR,VM,Keyword,Name`).
pub const PRIVATE_DICTIONARY: &str = include_str!("../data/private.csv");

/// File label used in load errors for the standard dictionary.
pub const STANDARD_FILE: &str = "standard.csv";

/// File label used in load errors for the private dictionary.
pub const PRIVATE_FILE: &str = "private.csv";
