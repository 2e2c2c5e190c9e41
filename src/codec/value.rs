//! Record values
//!
//! The closed set of kinds a slot can hold.

use std::fmt;

use super::{OpaqueValue, Tag};

/// A value stored in one slot
///
/// Eight scalar kinds map to dedicated tags; everything else goes through
/// [`Value::Opaque`], whose bytes were produced by a caller-chosen
/// [`PayloadCodec`](super::PayloadCodec).
///
/// Equality compares floats by bit pattern: a stored NaN matches itself and
/// `0.0` does not match `-0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Char(char),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Str(String),
    Opaque(OpaqueValue),
}

impl Value {
    /// Tag written in front of this value's payload
    pub fn tag(&self) -> Tag {
        match self {
            Value::Bool(_) => Tag::Bool,
            Value::Char(_) => Tag::Char,
            Value::Double(_) => Tag::Double,
            Value::Float(_) => Tag::Float,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Short(_) => Tag::Short,
            Value::Str(_) => Tag::Str,
            Value::Opaque(_) => Tag::Opaque,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueValue> {
        match self {
            Value::Opaque(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}f", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}L", v),
            Value::Short(v) => write!(f, "{}s", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Opaque(v) => write!(f, "<opaque {} bytes>", v.len()),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    char => Char,
    f64 => Double,
    f32 => Float,
    i32 => Int,
    i64 => Long,
    i16 => Short,
    String => Str,
    OpaqueValue => Opaque,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
