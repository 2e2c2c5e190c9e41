//! Record Store
//!
//! Fixed-stride random-access record file.
//!
//! ## Responsibilities
//! - Create the file (header) or read the stride back from it
//! - Presence checks, reads and writes addressed by slot index
//! - Tombstone deletion and first-fit reuse of empty slots
//! - Value-equality scans (find / delete / replace)
//! - Dense rewrite passes (compact, copy, rename)
//!
//! Every operation opens its own handle, does one seek plus one read or
//! write, and drops the handle before returning.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::codec::{self, Tag, Value, EMPTY_TAG, TAG_SIZE};
use crate::config::{StoreConfig, SyncStrategy, DEFAULT_STRIDE};
use crate::error::{Result, SlotError};
use crate::naming;

use super::free_slots::{self, FreeSlots};
use super::scan::Scan;
use super::slot::{SlotAddressing, HEADER_SIZE};

/// A single-file store of tagged records in fixed-size slots
///
/// ## Concurrency:
/// - All methods use `&self`; mutations are serialized by `write_lock`, so
///   `append`'s first-fit pick and the write that follows cannot interleave
///   with another mutation on the same `RecordStore`.
/// - Nothing guards the file against a second `RecordStore` (or another
///   process) opened on the same path. One owner per file.
pub struct RecordStore {
    /// Backing file
    path: PathBuf,

    /// Stride and offset math
    addressing: SlotAddressing,

    /// Durability of each write
    sync_strategy: SyncStrategy,

    /// Serializes mutating operations
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Create or open a store with the given stride hint
    ///
    /// A hint `<= 0` falls back to [`DEFAULT_STRIDE`]. The hint is ignored
    /// when the file already exists.
    pub fn create(stride_hint: i32, path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder().stride(stride_hint).build();
        Self::open(path, config)
    }

    /// Open or create a store
    ///
    /// On open:
    /// 1. Validate the file name
    /// 2. If the file is missing (or too short to hold a header), write the
    ///    header with the configured stride
    /// 3. Otherwise read the stride from the header
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        naming::validate_store_path(&path)?;

        let existing_len = match fs::metadata(&path) {
            Ok(meta) => Some(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let stride = match existing_len {
            Some(len) if len >= HEADER_SIZE => stored_stride(&path)?,
            _ => {
                if existing_len.is_some() {
                    tracing::warn!("{} has a truncated header; rewriting it", path.display());
                }
                let stride = if config.stride <= 0 {
                    tracing::warn!(
                        "Stride must be greater than 0 (got {}); using default {}",
                        config.stride,
                        DEFAULT_STRIDE
                    );
                    DEFAULT_STRIDE
                } else {
                    config.stride
                };
                SlotAddressing::new(stride as u32)?;

                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                write_header(&path, stride)?;
                tracing::debug!("Created {} with stride {}", path.display(), stride);
                stride
            }
        };

        Ok(Self {
            path,
            addressing: SlotAddressing::new(stride as u32)?,
            sync_strategy: config.sync_strategy,
            write_lock: Mutex::new(()),
        })
    }

    /// Open an existing store without ever writing to it
    ///
    /// Fails with `Io(NotFound)` when the file is missing and with `Config`
    /// when it is too short to hold the stride header. Use this for
    /// inspection; [`RecordStore::open`] would rewrite the header.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        naming::validate_store_path(&path)?;

        let len = fs::metadata(&path)?.len();
        if len < HEADER_SIZE {
            return Err(SlotError::Config(format!(
                "{} is {} bytes, too short for the {} byte header",
                path.display(),
                len,
                HEADER_SIZE
            )));
        }
        let stride = stored_stride(&path)?;

        Ok(Self {
            path,
            addressing: SlotAddressing::new(stride as u32)?,
            sync_strategy: SyncStrategy::Flush,
            write_lock: Mutex::new(()),
        })
    }

    // =========================================================================
    // Presence and Reads
    // =========================================================================

    /// Whether slot `index` holds a record
    ///
    /// Index 0, a missing file and reads past end-of-file all answer `false`.
    pub fn has_record(&self, index: u32) -> Result<bool> {
        if index == 0 {
            return Ok(false);
        }
        Ok(self.read_tag(index)? != EMPTY_TAG)
    }

    /// Read the record in slot `index`
    ///
    /// Returns:
    /// - `Ok(Some(value))`: slot occupied and decodable
    /// - `Ok(None)`: empty slot, index 0, end-of-file, or undecodable payload
    pub fn read_at(&self, index: u32) -> Result<Option<Value>> {
        if index == 0 {
            return Ok(None);
        }
        let Some(mut file) = self.open_read()? else {
            return Ok(None);
        };

        let (offset, end) = self.addressing.window(index);
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| self.io_failure("seek", e))?;

        let mut tag = [0u8; TAG_SIZE];
        match file.read_exact(&mut tag) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(self.io_failure("read", e)),
        }

        let payload_limit = end - offset - TAG_SIZE as u64;
        let value = match Tag::from_byte(tag[0]) {
            None => None,
            Some(Tag::Opaque) => {
                drop(file);
                codec::read_frame_at(&self.path, offset + TAG_SIZE as u64, payload_limit)
                    .map(Value::Opaque)
            }
            Some(_) => codec::decode(tag[0], &mut file.take(payload_limit)),
        };

        if value.is_none() && tag[0] != EMPTY_TAG {
            tracing::trace!("Slot {} has tag {} but no readable payload", index, tag[0]);
        }
        Ok(value)
    }

    /// Iterate occupied slots in ascending order
    ///
    /// The iterator is bounded by the slot count at the time of the call.
    pub fn scan(&self) -> Result<Scan<'_>> {
        Ok(Scan::new(self, self.slot_count()?))
    }

    /// All readable records in slot order
    pub fn read_all(&self) -> Result<Vec<Value>> {
        Ok(self.scan()?.map(|(_, value)| value).collect())
    }

    /// Index of the first slot holding `value`
    pub fn find_first(&self, value: &Value) -> Result<Option<u32>> {
        Ok(self
            .scan()?
            .find(|(_, stored)| stored == value)
            .map(|(index, _)| index))
    }

    /// Iterate unoccupied slots in `[1, slot_count]`
    pub fn free_slots(&self) -> Result<FreeSlots<'_>> {
        Ok(FreeSlots::new(self, self.slot_count()?))
    }

    /// Ascending list of unoccupied slots in `[1, slot_count]`
    pub fn empty_slots(&self) -> Result<Vec<u32>> {
        Ok(self.free_slots()?.collect())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write `value` into the empty slot `index`
    ///
    /// Fails with `SlotOccupied` instead of overwriting, and with
    /// `ValueTooLarge` when the encoded record exceeds the stride.
    pub fn write_at(&self, value: impl Into<Value>, index: u32) -> Result<()> {
        SlotAddressing::check_index(index)?;
        let value = value.into();
        let _guard = self.write_lock.lock();
        self.write_unlocked(&value, index)
    }

    /// Write `value` into the first empty slot and return its index
    pub fn append(&self, value: impl Into<Value>) -> Result<u32> {
        let value = value.into();
        self.check_fits(&value)?;

        let _guard = self.write_lock.lock();
        let index = free_slots::first_fit(self)?;
        self.write_unlocked(&value, index)?;
        Ok(index)
    }

    /// Append each value after the last slot, in order
    ///
    /// Stops at the first failure; values written before it stay written.
    pub fn write_all<I>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let _guard = self.write_lock.lock();
        let mut written = 0;
        for value in values {
            let index = self.tail_index()?;
            self.write_unlocked(&value.into(), index)?;
            written += 1;
        }
        Ok(written)
    }

    // =========================================================================
    // Deletes
    // =========================================================================

    /// Tombstone slot `index`
    ///
    /// Returns `false` when the slot was already empty. File length and
    /// other slots are untouched.
    pub fn delete_at(&self, index: u32) -> Result<bool> {
        SlotAddressing::check_index(index)?;
        let _guard = self.write_lock.lock();
        self.delete_unlocked(index)
    }

    /// Tombstone the first slot holding `value`
    pub fn delete_first(&self, value: &Value) -> Result<bool> {
        let _guard = self.write_lock.lock();
        match self.find_first(value)? {
            Some(index) => self.delete_unlocked(index),
            None => Ok(false),
        }
    }

    /// Tombstone every slot holding `value`; returns how many
    pub fn delete_all(&self, value: &Value) -> Result<usize> {
        let _guard = self.write_lock.lock();
        let matches: Vec<u32> = self
            .scan()?
            .filter(|(_, stored)| stored == value)
            .map(|(index, _)| index)
            .collect();

        for &index in &matches {
            self.delete_unlocked(index)?;
        }
        Ok(matches.len())
    }

    /// Tombstone every slot; the file keeps its length
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        for index in 1..=self.slot_count()? {
            self.delete_unlocked(index)?;
        }
        Ok(())
    }

    // =========================================================================
    // Replaces
    // =========================================================================

    /// Replace whatever slot `index` holds with `value`
    ///
    /// The size check runs before the old record is tombstoned, so a value
    /// that does not fit leaves the slot as it was.
    pub fn replace_at(&self, index: u32, value: impl Into<Value>) -> Result<()> {
        SlotAddressing::check_index(index)?;
        let value = value.into();
        self.check_fits(&value)?;

        let _guard = self.write_lock.lock();
        self.replace_unlocked(index, &value)
    }

    /// Replace the first record equal to `original`
    pub fn replace_first(&self, original: &Value, replacement: impl Into<Value>) -> Result<bool> {
        let replacement = replacement.into();
        self.check_fits(&replacement)?;

        let _guard = self.write_lock.lock();
        match self.find_first(original)? {
            Some(index) => {
                self.replace_unlocked(index, &replacement)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace every record equal to `original`; returns how many
    pub fn replace_all(&self, original: &Value, replacement: impl Into<Value>) -> Result<usize> {
        let replacement = replacement.into();
        self.check_fits(&replacement)?;

        let _guard = self.write_lock.lock();
        let matches: Vec<u32> = self
            .scan()?
            .filter(|(_, stored)| stored == original)
            .map(|(index, _)| index)
            .collect();

        for &index in &matches {
            self.replace_unlocked(index, &replacement)?;
        }
        Ok(matches.len())
    }

    // =========================================================================
    // Whole-file Passes
    // =========================================================================

    /// Drop empty slots by rewriting all records densely from slot 1
    ///
    /// Every index is renumbered. Returns the number of records kept.
    pub fn compact(&self) -> Result<usize> {
        let _guard = self.write_lock.lock();
        let values = self.read_all()?;
        self.rewrite_unlocked(&values)?;
        tracing::debug!("Compacted {} into {} records", self.path.display(), values.len());
        Ok(values.len())
    }

    /// Discard the file contents and write `values` densely from slot 1
    pub fn rewrite<I>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let _guard = self.write_lock.lock();
        self.rewrite_unlocked(&values)?;
        Ok(values.len())
    }

    /// Copy all records densely into a new store with the same stride
    ///
    /// If `destination` already exists a " - copy" sibling name is used
    /// instead. Indices in the copy are renumbered.
    pub fn copy_to(&self, destination: impl AsRef<Path>) -> Result<RecordStore> {
        let destination = destination.as_ref();
        let destination = if destination.exists() {
            naming::copy_path(destination)
        } else {
            destination.to_path_buf()
        };

        let config = StoreConfig::builder()
            .stride(self.stride() as i32)
            .sync_strategy(self.sync_strategy)
            .build();
        let copy = RecordStore::open(&destination, config)?;
        copy.write_all(self.read_all()?)?;

        tracing::debug!("Copied {} to {}", self.path.display(), destination.display());
        Ok(copy)
    }

    /// Copy into an auto-named sibling (`name - copy.ext`, `name - copy (2).ext`, ...)
    pub fn copy(&self) -> Result<RecordStore> {
        self.copy_to(naming::copy_path(&self.path))
    }

    /// Move the store to `new_name` in the same directory
    ///
    /// The name must pass [`naming::validate_file_name`]; `.dat` is appended
    /// when missing. Records are rewritten densely at the new path and the old
    /// file is removed only after that succeeds.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        naming::validate_file_name(new_name)?;
        let new_path = self.path.with_file_name(naming::with_dat_extension(new_name));
        if new_path == self.path {
            return Ok(());
        }
        if new_path.exists() {
            return Err(SlotError::InvalidPath(format!(
                "{} already exists",
                new_path.display()
            )));
        }

        let values = self.read_all()?;
        let old_path = std::mem::replace(&mut self.path, new_path);
        if let Err(e) = self.rewrite_unlocked(&values) {
            discard_partial(&self.path);
            self.path = old_path;
            return Err(e);
        }
        fs::remove_file(&old_path)?;

        tracing::debug!("Renamed {} to {}", old_path.display(), self.path.display());
        Ok(())
    }

    /// Delete the backing file; `false` if it did not exist
    pub fn remove_file(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_failure("remove", e)),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Slot stride in bytes
    pub fn stride(&self) -> u32 {
        self.addressing.stride()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Current file length in bytes (0 if missing)
    pub fn file_size(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.io_failure("stat", e)),
        }
    }

    /// `floor(file_size / stride)`, empty slots included
    pub fn slot_count(&self) -> Result<u32> {
        Ok(self.addressing.slot_count(self.file_size()?))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_fits(&self, value: &Value) -> Result<()> {
        if !codec::fits(value, self.stride()) {
            return Err(SlotError::ValueTooLarge {
                size: codec::encoded_len(value),
                stride: self.stride(),
            });
        }
        Ok(())
    }

    /// First slot whose window has not started yet
    ///
    /// Equals `slot_count + 1` unless the file ends exactly on a slot
    /// boundary, in which case that slot has no bytes and comes first.
    fn tail_index(&self) -> Result<u32> {
        let size = self.file_size()?;
        let count = self.addressing.slot_count(size);
        if count > 0 && self.addressing.offset(count) >= size {
            Ok(count)
        } else {
            Ok(count.saturating_add(1))
        }
    }

    fn write_unlocked(&self, value: &Value, index: u32) -> Result<()> {
        if self.has_record(index)? {
            return Err(SlotError::SlotOccupied { index });
        }
        self.check_fits(value)?;

        let bytes = codec::encode(value)?;
        self.write_bytes(self.addressing.offset(index), &bytes)?;
        tracing::debug!("Wrote {} bytes to slot {}", bytes.len(), index);
        Ok(())
    }

    fn delete_unlocked(&self, index: u32) -> Result<bool> {
        if !self.has_record(index)? {
            return Ok(false);
        }
        self.write_bytes(self.addressing.offset(index), &[EMPTY_TAG])?;
        tracing::debug!("Tombstoned slot {}", index);
        Ok(true)
    }

    fn replace_unlocked(&self, index: u32, value: &Value) -> Result<()> {
        self.delete_unlocked(index)?;
        self.write_unlocked(value, index)
    }

    fn rewrite_unlocked(&self, values: &[Value]) -> Result<()> {
        write_header(&self.path, self.stride() as i32)?;
        for (i, value) in values.iter().enumerate() {
            self.write_unlocked(value, i as u32 + 1)?;
        }
        Ok(())
    }

    fn read_tag(&self, index: u32) -> Result<u8> {
        let Some(mut file) = self.open_read()? else {
            return Ok(EMPTY_TAG);
        };
        file.seek(SeekFrom::Start(self.addressing.offset(index)))
            .map_err(|e| self.io_failure("seek", e))?;

        let mut tag = [0u8; TAG_SIZE];
        match file.read_exact(&mut tag) {
            Ok(()) => Ok(tag[0]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(EMPTY_TAG),
            Err(e) => Err(self.io_failure("read", e)),
        }
    }

    fn open_read(&self) -> Result<Option<File>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_failure("open", e)),
        }
    }

    fn write_bytes(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_failure("open", e))?;

        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(bytes))
            .and_then(|_| match self.sync_strategy {
                SyncStrategy::Flush => file.flush(),
                SyncStrategy::EveryWrite => file.sync_data(),
            })
            .map_err(|e| self.io_failure("write", e))
    }

    fn io_failure(&self, op: &str, err: io::Error) -> SlotError {
        tracing::error!("Failed to {} {}: {}", op, self.path.display(), err);
        SlotError::Io(err)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("stride", &self.stride())
            .field("sync_strategy", &self.sync_strategy)
            .finish()
    }
}

// =============================================================================
// Header
// =============================================================================

/// Truncate (or create) `path` and write the stride header
fn write_header(path: &Path, stride: i32) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(&stride.to_be_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Remove a half-written file; `false` (with a warning) if it is left behind
fn discard_partial(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!("Failed to remove partial file {}: {}", path.display(), e);
            false
        }
    }
}

/// Stride from the header, or the default when it holds a value `<= 0`
fn stored_stride(path: &Path) -> Result<i32> {
    let stored = read_header(path)?;
    if stored <= 0 {
        tracing::warn!(
            "Header of {} holds stride {}; using default {}",
            path.display(),
            stored,
            DEFAULT_STRIDE
        );
        return Ok(DEFAULT_STRIDE);
    }
    Ok(stored)
}

fn read_header(path: &Path) -> Result<i32> {
    let mut file = File::open(path)?;
    let mut header = [0u8; HEADER_SIZE as usize];
    file.read_exact(&mut header)?;
    Ok(i32::from_be_bytes(header))
}
