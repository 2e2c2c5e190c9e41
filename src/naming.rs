//! File naming helpers
//!
//! Name validation for store files and generation of copy names.

use std::path::{Path, PathBuf};

use crate::error::{Result, SlotError};

/// Characters a store file name may not contain
pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Extension enforced by `RecordStore::rename`
pub const STORE_EXTENSION: &str = "dat";

/// Whether `name` is usable as a file name
///
/// Rejects names made only of whitespace and names containing any of
/// [`FORBIDDEN_CHARS`].
pub fn is_valid_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(&FORBIDDEN_CHARS[..])
}

pub fn validate_file_name(name: &str) -> Result<()> {
    if is_valid_file_name(name) {
        Ok(())
    } else {
        Err(SlotError::InvalidPath(format!(
            "{:?}: file names may not be blank or contain any of \\ / : * ? \" < > |",
            name
        )))
    }
}

/// Validate the file-name component of a store path
pub fn validate_store_path(path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .ok_or_else(|| SlotError::InvalidPath(format!("{} has no file name", path.display())))?
        .to_str()
        .ok_or_else(|| {
            SlotError::InvalidPath(format!("{} is not valid UTF-8", path.display()))
        })?;
    validate_file_name(name)
}

/// Append `.dat` unless `name` already ends with it
pub fn with_dat_extension(name: &str) -> String {
    let suffix = format!(".{}", STORE_EXTENSION);
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// First free sibling name for a copy of `path`
///
/// `dir/data.dat` → `dir/data - copy.dat`, then `dir/data - copy (2).dat`,
/// `dir/data - copy (3).dat`, ...
pub fn copy_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n: u32 = 1;
    loop {
        let name = if n == 1 {
            format!("{} - copy{}", stem, extension)
        } else {
            format!("{} - copy ({}){}", stem, n, extension)
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
