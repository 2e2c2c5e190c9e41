//! # slotstore
//!
//! A single-file random-access record store with:
//! - Fixed-size slots addressed by a 1-based index
//! - Tagged scalar records plus an opaque escape hatch for serde types
//! - Tombstone deletion and first-fit reuse of empty slots
//! - Explicit compaction, copy and rename passes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RecordStore                            │
//! │        (read/write/delete/replace/scan, write lock)           │
//! └──────────┬──────────────────┬───────────────────┬───────────┘
//!            │                  │                   │
//!            ▼                  ▼                   ▼
//!   ┌─────────────────┐ ┌───────────────┐  ┌─────────────────┐
//!   │ Slot Addressing │ │  Free Slots   │  │     Naming      │
//!   │ (index*stride)  │ │  (first-fit)  │  │ (validate/copy) │
//!   └─────────────────┘ └───────────────┘  └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────────────────────────┐
//!   │               Codec                  │
//!   │   Tag codec  +  Spillover (opaque)   │
//!   └─────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use slotstore::{RecordStore, Value};
//!
//! # fn main() -> slotstore::Result<()> {
//! let store = RecordStore::create(32, "records.dat")?;
//! store.write_at("hi", 1)?;
//! assert_eq!(store.read_at(1)?, Some(Value::from("hi")));
//!
//! store.delete_at(1)?;
//! let index = store.append(42)?;
//! assert_eq!(index, 1);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod naming;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{Bincode, OpaqueValue, PayloadCodec, Spill, Tag, Value};
pub use config::{StoreConfig, SyncStrategy, DEFAULT_STRIDE};
pub use error::{Result, SlotError};
pub use storage::RecordStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
