//! Natural type descriptors and the per-representation table.

use std::fmt;

use dtt_dictionary::Dictionary;
use dtt_model::{Multiplicity, Tag, Vr};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// Primitive storage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NaturalKind {
    String,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Date,
    Time,
    DateTime,
    Binary,
}

impl fmt::Display for NaturalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::Binary => "Binary",
        };
        f.write_str(name)
    }
}

/// Storage type handed to a schema generator.
///
/// `width: None` on a string kind means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: NaturalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<(u8, u8)>,
}

impl TypeDescriptor {
    /// Descriptor without width or precision.
    #[must_use]
    pub const fn of(kind: NaturalKind) -> Self {
        Self {
            kind,
            width: None,
            precision: None,
        }
    }

    /// Bounded string.
    #[must_use]
    pub const fn string(width: usize) -> Self {
        Self {
            kind: NaturalKind::String,
            width: Some(width),
            precision: None,
        }
    }

    /// Unbounded string.
    #[must_use]
    pub const fn text() -> Self {
        Self::of(NaturalKind::String)
    }

    /// Decimal with `(precision, scale)`.
    #[must_use]
    pub const fn decimal(precision: u8, scale: u8) -> Self {
        Self {
            kind: NaturalKind::Decimal,
            width: None,
            precision: Some((precision, scale)),
        }
    }

    /// Whether this is an unbounded string.
    #[must_use]
    pub const fn is_unbounded_string(&self) -> bool {
        matches!(self.kind, NaturalKind::String) && self.width.is_none()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.width, self.precision) {
            (_, Some((precision, scale))) => write!(f, "{}({precision},{scale})", self.kind),
            (Some(width), None) => write!(f, "{}({width})", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

/// Descriptor for a single-valued attribute of representation `vr`.
///
/// Widths follow the maximum value lengths of each representation.
#[must_use]
pub const fn descriptor_for_vr(vr: Vr) -> TypeDescriptor {
    use NaturalKind as K;
    match vr {
        Vr::AE | Vr::CS | Vr::SH => TypeDescriptor::string(16),
        Vr::AS => TypeDescriptor::string(4),
        Vr::AT => TypeDescriptor::string(12),
        Vr::LO | Vr::UI => TypeDescriptor::string(64),
        Vr::PN => TypeDescriptor::string(324),
        Vr::ST => TypeDescriptor::string(1024),
        Vr::LT => TypeDescriptor::string(10240),
        Vr::SQ | Vr::UC | Vr::UR | Vr::UT => TypeDescriptor::text(),
        Vr::DA => TypeDescriptor::of(K::Date),
        Vr::TM => TypeDescriptor::of(K::Time),
        Vr::DT => TypeDescriptor::of(K::DateTime),
        Vr::DS => TypeDescriptor::decimal(19, 19),
        Vr::IS | Vr::SL => TypeDescriptor::of(K::Int32),
        Vr::SS => TypeDescriptor::of(K::Int16),
        Vr::US => TypeDescriptor::of(K::UInt16),
        Vr::UL => TypeDescriptor::of(K::UInt32),
        Vr::SV => TypeDescriptor::of(K::Int64),
        Vr::UV => TypeDescriptor::of(K::UInt64),
        Vr::FL => TypeDescriptor::of(K::Float32),
        Vr::FD => TypeDescriptor::of(K::Float64),
        Vr::OB | Vr::OD | Vr::OF | Vr::OL | Vr::OV | Vr::OW | Vr::UN => {
            TypeDescriptor::of(K::Binary)
        }
    }
}

/// Natural type of an attribute allowing `vrs` with multiplicity `vm`.
///
/// Multi-valued attributes are stored as one delimited string, so they map
/// to an unbounded string whatever their representation.
pub fn natural_type(vrs: &[Vr], vm: Multiplicity) -> Result<TypeDescriptor> {
    if vrs.is_empty() {
        return Err(TypeError::NoRepresentation);
    }
    if vm.allows_multiple() {
        return Ok(TypeDescriptor::text());
    }
    let descriptors: Vec<TypeDescriptor> = vrs.iter().copied().map(descriptor_for_vr).collect();
    conflate(&descriptors)
}

/// [`natural_type`] for representation codes such as `["US", "SS"]`.
pub fn natural_type_for_codes(codes: &[&str], vm: Multiplicity) -> Result<TypeDescriptor> {
    let vrs = codes
        .iter()
        .map(|code| {
            code.parse::<Vr>().map_err(|_| TypeError::UnknownVr {
                code: (*code).to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    natural_type(&vrs, vm)
}

/// Natural type of `tag` according to `dict`.
pub fn natural_type_for_tag(dict: &Dictionary, tag: &Tag) -> Result<TypeDescriptor> {
    let entry = dict.by_tag(tag);
    natural_type(&entry.vrs, entry.vm)
}

/// Merge descriptors of the representations one attribute may carry.
///
/// Matching kinds keep the widest width and precision. A signed and an
/// unsigned 16-bit integer widen to `Int32`. Any other mismatch fails.
pub fn conflate(descriptors: &[TypeDescriptor]) -> Result<TypeDescriptor> {
    let (first, rest) = descriptors
        .split_first()
        .ok_or(TypeError::NoRepresentation)?;
    rest.iter().try_fold(*first, |merged, next| merge(merged, *next))
}

fn merge(left: TypeDescriptor, right: TypeDescriptor) -> Result<TypeDescriptor> {
    use NaturalKind as K;
    match (left.kind, right.kind) {
        (K::Int16, K::UInt16) | (K::UInt16, K::Int16) => Ok(TypeDescriptor::of(K::Int32)),
        (a, b) if a == b => Ok(TypeDescriptor {
            kind: a,
            width: merge_width(a, left.width, right.width),
            precision: merge_precision(left.precision, right.precision),
        }),
        (a, b) => Err(TypeError::IncompatibleTypes { left: a, right: b }),
    }
}

fn merge_width(kind: NaturalKind, left: Option<usize>, right: Option<usize>) -> Option<usize> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.max(b)),
        // an unbounded string absorbs any bounded one
        (None, _) | (_, None) if kind == NaturalKind::String => None,
        (a, b) => a.or(b),
    }
}

fn merge_precision(left: Option<(u8, u8)>, right: Option<(u8, u8)>) -> Option<(u8, u8)> {
    match (left, right) {
        (Some((p1, s1)), Some((p2, s2))) => Some((p1.max(p2), s1.max(s2))),
        (a, b) => a.or(b),
    }
}
