//! Slot addressing
//!
//! Maps a 1-based slot index to its byte window in the store file.
//!
//! Slot `i` starts at `i * stride`, so slot 0's window holds the 4-byte
//! header followed by `stride - 4` unused bytes. Existing files rely on that
//! gap and it must not be reclaimed.

use crate::error::{Result, SlotError};

/// Header size: Stride (4)
pub const HEADER_SIZE: u64 = 4;

/// Byte layout of one store file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddressing {
    stride: u32,
}

impl SlotAddressing {
    /// Build the addressing for `stride`
    ///
    /// Strides smaller than the header would put slot 1 on top of it.
    pub fn new(stride: u32) -> Result<Self> {
        if u64::from(stride) < HEADER_SIZE {
            return Err(SlotError::Config(format!(
                "stride {} is smaller than the {} byte header",
                stride, HEADER_SIZE
            )));
        }
        Ok(Self { stride })
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset of slot `index`
    pub fn offset(&self, index: u32) -> u64 {
        u64::from(index) * u64::from(self.stride)
    }

    /// Byte range `[start, end)` of slot `index`
    pub fn window(&self, index: u32) -> (u64, u64) {
        let start = self.offset(index);
        (start, start + u64::from(self.stride))
    }

    /// Number of slot windows a file of `file_size` bytes has started
    ///
    /// Counts slot 0 (the header window) when the file is at least one
    /// stride long, which is why valid indices run `1..=slot_count`.
    pub fn slot_count(&self, file_size: u64) -> u32 {
        let count = file_size / u64::from(self.stride);
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Reject index 0
    pub fn check_index(index: u32) -> Result<()> {
        if index == 0 {
            return Err(SlotError::InvalidIndex(index));
        }
        Ok(())
    }
}
