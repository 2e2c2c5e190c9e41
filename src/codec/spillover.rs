//! Spillover codec
//!
//! Values outside the scalar tag set are stored as an opaque frame:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │ Serialized bytes (Len)       │
//! └──────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! The bytes come from a caller-supplied [`PayloadCodec`]. [`Bincode`] covers
//! any serde type.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SlotError};

/// Length prefix in front of the serialized bytes
pub const FRAME_HEADER_SIZE: usize = 4;

// =============================================================================
// Payload codecs
// =============================================================================

/// Turns a caller type into opaque slot bytes and back
pub trait PayloadCodec<T> {
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>>;
    fn from_bytes(&self, bytes: &[u8]) -> Result<T>;
}

/// bincode-backed codec for any serde type
#[derive(Debug, Clone, Copy, Default)]
pub struct Bincode;

impl<T: Serialize + DeserializeOwned> PayloadCodec<T> for Bincode {
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}

// =============================================================================
// Opaque value
// =============================================================================

/// Serialized payload of a non-scalar value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueValue {
    bytes: Vec<u8>,
}

impl OpaqueValue {
    /// Wrap bytes that were already serialized by the caller
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Serialize `value` with bincode
    pub fn serialize<T: Serialize + DeserializeOwned>(value: &T) -> Result<Self> {
        Self::encode_with(&Bincode, value)
    }

    /// Deserialize the payload with bincode
    pub fn deserialize<T: Serialize + DeserializeOwned>(&self) -> Result<T> {
        self.decode_with(&Bincode)
    }

    pub fn encode_with<T, C: PayloadCodec<T>>(codec: &C, value: &T) -> Result<Self> {
        Ok(Self::from_bytes(codec.to_bytes(value)?))
    }

    pub fn decode_with<T, C: PayloadCodec<T>>(&self, codec: &C) -> Result<T> {
        codec.from_bytes(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append `len (4) + bytes` to `out`
    pub(crate) fn write_frame(&self, out: &mut Vec<u8>) -> Result<()> {
        let len = u32::try_from(self.bytes.len()).map_err(|_| {
            SlotError::Unencodable(format!(
                "opaque payload of {} bytes exceeds the frame limit",
                self.bytes.len()
            ))
        })?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.bytes);
        Ok(())
    }
}

/// Typed view over an [`OpaqueValue`] for a fixed codec
///
/// Lets callers keep the codec choice in one place:
/// `let people = Spill::<Person, _>::new(Bincode);`
#[derive(Debug, Clone, Copy)]
pub struct Spill<T, C> {
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C: PayloadCodec<T>> Spill<T, C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            _marker: PhantomData,
        }
    }

    pub fn pack(&self, value: &T) -> Result<OpaqueValue> {
        OpaqueValue::encode_with(&self.codec, value)
    }

    pub fn unpack(&self, opaque: &OpaqueValue) -> Result<T> {
        opaque.decode_with(&self.codec)
    }
}

// =============================================================================
// Frame reading
// =============================================================================

/// Read one `len (4) + bytes` frame; `None` on a short read
pub(crate) fn read_frame<R: Read>(reader: &mut R) -> Option<OpaqueValue> {
    let mut len_buf = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut len_buf).ok()?;
    let len = u32::from_be_bytes(len_buf) as u64;

    // bounded by take(): the length prefix is untrusted
    let mut bytes = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut bytes).ok()?;
    if bytes.len() as u64 != len {
        return None;
    }
    Some(OpaqueValue::from_bytes(bytes))
}

/// Read one frame from `path` at `offset` through a fresh handle
///
/// `limit` is the number of bytes left in the slot window; a frame claiming
/// more than that is treated as unreadable.
pub(crate) fn read_frame_at(path: &Path, offset: u64, limit: u64) -> Option<OpaqueValue> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("Failed to reopen {} for opaque read: {}", path.display(), e);
            return None;
        }
    };
    file.seek(SeekFrom::Start(offset)).ok()?;
    read_frame(&mut file.take(limit))
}

// =============================================================================
// Tests
// =============================================================================
