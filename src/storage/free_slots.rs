//! Free-slot manager
//!
//! Finds unoccupied slots for reuse.
//!
//! Selection and the write that follows are only atomic while the caller
//! holds the store's write lock; `RecordStore::append` does.

use crate::error::Result;

use super::RecordStore;

/// Iterator over unoccupied indices in `[1, slot_count]`, ascending
pub struct FreeSlots<'a> {
    store: &'a RecordStore,
    next: u64,
    end: u64,
}

impl<'a> FreeSlots<'a> {
    pub(super) fn new(store: &'a RecordStore, slot_count: u32) -> Self {
        Self {
            store,
            next: 1,
            end: u64::from(slot_count),
        }
    }
}

impl<'a> Iterator for FreeSlots<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.end {
            let index = self.next as u32;
            self.next += 1;

            match self.store.has_record(index) {
                Ok(false) => return Some(index),
                Ok(true) => continue,
                // an unreadable slot is never offered for reuse
                Err(e) => {
                    tracing::warn!("Cannot probe slot {}: {}", index, e);
                }
            }
        }
        None
    }
}

/// First unoccupied index in `[1, slot_count + 1]`
///
/// The upper bound starts past the last slot window, so the search always
/// succeeds.
pub(super) fn first_fit(store: &RecordStore) -> Result<u32> {
    let count = store.slot_count()?;
    for index in 1..=count {
        if !store.has_record(index)? {
            return Ok(index);
        }
    }
    Ok(count.saturating_add(1))
}
