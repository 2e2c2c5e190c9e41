//! Tag codec
//!
//! Encodes one value as `tag (1) + payload` and decodes it back.
//!
//! Decoding never fails: an empty tag, an unknown tag or a payload cut short
//! by end-of-file all collapse to `None`, so a scan can step over a damaged
//! slot instead of aborting.

use std::io::{self, Read};

use crate::error::{Result, SlotError};

use super::spillover::{read_frame, FRAME_HEADER_SIZE};
use super::Value;

/// Tag byte marking an empty (never written or tombstoned) slot
pub const EMPTY_TAG: u8 = 0;

/// Size of the tag prefix
pub const TAG_SIZE: usize = 1;

/// Length prefix in front of string payloads
const STR_LEN_SIZE: usize = 2;

/// Type tag written as the first byte of every occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Bool = 0x01,
    Char = 0x02,
    Double = 0x03,
    Float = 0x04,
    Int = 0x05,
    Long = 0x06,
    Short = 0x07,
    Str = 0x08,
    Opaque = 0x64,
}

impl Tag {
    /// Parse a tag byte; `None` for the empty tag and for unknown bytes
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0x01 => Some(Tag::Bool),
            0x02 => Some(Tag::Char),
            0x03 => Some(Tag::Double),
            0x04 => Some(Tag::Float),
            0x05 => Some(Tag::Int),
            0x06 => Some(Tag::Long),
            0x07 => Some(Tag::Short),
            0x08 => Some(Tag::Str),
            0x64 => Some(Tag::Opaque),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Payload width for fixed-size kinds
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::Bool => Some(1),
            Tag::Char | Tag::Short => Some(2),
            Tag::Float | Tag::Int => Some(4),
            Tag::Double | Tag::Long => Some(8),
            Tag::Str | Tag::Opaque => None,
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> std::result::Result<Self, Self::Error> {
        Tag::from_byte(byte).ok_or(byte)
    }
}

// =============================================================================
// Sizing
// =============================================================================

/// Exact number of bytes `encode(value)` produces, tag included
pub fn encoded_len(value: &Value) -> usize {
    let payload = match value {
        Value::Str(s) => STR_LEN_SIZE + s.len(),
        Value::Opaque(o) => FRAME_HEADER_SIZE + o.len(),
        other => other
            .tag()
            .fixed_width()
            .unwrap_or_default(),
    };
    TAG_SIZE + payload
}

/// Whether `value` fits in a slot of `stride` bytes
pub fn fits(value: &Value, stride: u32) -> bool {
    encoded_len(value) <= stride as usize
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to bytes
///
/// Format: tag (1) + payload
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(value));
    out.push(value.tag().as_byte());

    match value {
        Value::Bool(v) => out.push(u8::from(*v)),
        Value::Char(c) => {
            let mut units = [0u16; 2];
            let encoded = c.encode_utf16(&mut units);
            if encoded.len() != 1 {
                return Err(SlotError::Unencodable(format!(
                    "char {:?} needs a surrogate pair",
                    c
                )));
            }
            out.extend_from_slice(&units[0].to_be_bytes());
        }
        Value::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Str(s) => {
            let len = u16::try_from(s.len()).map_err(|_| {
                SlotError::Unencodable(format!(
                    "string of {} bytes exceeds the {} byte limit",
                    s.len(),
                    u16::MAX
                ))
            })?;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Value::Opaque(o) => o.write_frame(&mut out)?,
    }

    Ok(out)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode the payload that follows `tag`
///
/// Returns `None` for the empty tag, unknown tags, truncated payloads and
/// invalid text.
pub fn decode<R: Read>(tag: u8, reader: &mut R) -> Option<Value> {
    let tag = Tag::from_byte(tag)?;

    let value = match tag {
        Tag::Bool => Value::Bool(read_array::<_, 1>(reader).ok()?[0] != 0),
        Tag::Char => {
            let unit = u16::from_be_bytes(read_array(reader).ok()?);
            Value::Char(char::from_u32(u32::from(unit))?)
        }
        Tag::Double => Value::Double(f64::from_be_bytes(read_array(reader).ok()?)),
        Tag::Float => Value::Float(f32::from_be_bytes(read_array(reader).ok()?)),
        Tag::Int => Value::Int(i32::from_be_bytes(read_array(reader).ok()?)),
        Tag::Long => Value::Long(i64::from_be_bytes(read_array(reader).ok()?)),
        Tag::Short => Value::Short(i16::from_be_bytes(read_array(reader).ok()?)),
        Tag::Str => {
            let len = u16::from_be_bytes(read_array(reader).ok()?) as usize;
            let mut bytes = vec![0u8; len];
            reader.read_exact(&mut bytes).ok()?;
            Value::Str(String::from_utf8(bytes).ok()?)
        }
        Tag::Opaque => Value::Opaque(read_frame(reader)?),
    };

    Some(value)
}

/// Decode a full record (`tag + payload`) from a byte slice
pub fn decode_record(bytes: &[u8]) -> Option<Value> {
    let (&tag, mut payload) = bytes.split_first()?;
    decode(tag, &mut payload)
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

// =============================================================================
// Tests
// =============================================================================
