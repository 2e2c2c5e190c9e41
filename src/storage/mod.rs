//! Storage Module
//!
//! Fixed-stride random-access record file.
//!
//! ## Responsibilities
//! - Map slot indices to byte offsets
//! - Read, write and tombstone records in place
//! - Reuse empty slots first-fit
//! - Dense rewrite passes (compact, copy, rename)
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Slot 0 window (stride bytes)           │
//! │ ┌──────────────┬─────────────────────┐ │
//! │ │ Stride i32(4)│ unused (stride - 4) │ │
//! │ └──────────────┴─────────────────────┘ │
//! ├────────────────────────────────────────┤
//! │ Slot 1 window (stride bytes)           │
//! │ ┌────────┬──────────────┬──────────┐   │
//! │ │ Tag (1)│ Payload      │ residue  │   │
//! │ └────────┴──────────────┴──────────┘   │
//! ├────────────────────────────────────────┤
//! │ ... slot k at offset k * stride ...    │
//! └────────────────────────────────────────┘
//! ```
//!
//! Tag 0 marks an empty slot. The file is not padded: it ends where the
//! last written record ends.

mod free_slots;
mod scan;
mod slot;
mod store;

pub use free_slots::FreeSlots;
pub use scan::Scan;
pub use slot::{SlotAddressing, HEADER_SIZE};
pub use store::RecordStore;
