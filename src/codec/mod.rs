//! Codec Module
//!
//! Encoding and decoding of a single slot record.
//!
//! ## Record Format
//! ```text
//! ┌─────────┬──────────────────────────────────────────┐
//! │ Tag (1) │ Payload (type-specific, big-endian)      │
//! └─────────┴──────────────────────────────────────────┘
//! ```
//!
//! ### Tags
//! - 0x00: EMPTY   - tombstone / never written
//! - 0x01: BOOL    - 1 byte
//! - 0x02: CHAR    - 2 bytes (one UTF-16 code unit)
//! - 0x03: DOUBLE  - 8 bytes
//! - 0x04: FLOAT   - 4 bytes
//! - 0x05: INT     - 4 bytes
//! - 0x06: LONG    - 8 bytes
//! - 0x07: SHORT   - 2 bytes
//! - 0x08: STRING  - len (2) + UTF-8 bytes
//! - 0x64: OPAQUE  - len (4) + serialized bytes (spillover frame)

mod spillover;
mod tag;
mod value;

pub use spillover::{Bincode, OpaqueValue, PayloadCodec, Spill, FRAME_HEADER_SIZE};
pub use tag::{decode, decode_record, encode, encoded_len, fits, Tag, EMPTY_TAG, TAG_SIZE};
pub use value::Value;

pub(crate) use spillover::read_frame_at;
