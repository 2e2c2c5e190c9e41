//! Slot scan
//!
//! Sequential iteration over occupied slots.

use crate::codec::Value;

use super::RecordStore;

/// Iterator over `(index, value)` for occupied slots, ascending
///
/// Holds no file handle between steps; each step is an independent
/// `read_at`. A slot that fails to read is logged and skipped so one bad
/// slot never ends the scan.
pub struct Scan<'a> {
    store: &'a RecordStore,
    /// Next index to probe
    next: u64,
    /// Last index to probe (slot count when the scan started)
    end: u64,
}

impl<'a> Scan<'a> {
    pub(super) fn new(store: &'a RecordStore, slot_count: u32) -> Self {
        Self {
            store,
            next: 1,
            end: u64::from(slot_count),
        }
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = (u32, Value);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.end {
            let index = self.next as u32;
            self.next += 1;

            match self.store.read_at(index) {
                Ok(Some(value)) => return Some((index, value)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Skipping slot {} during scan: {}", index, e);
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next - 1) as usize;
        (0, Some(remaining))
    }
}
