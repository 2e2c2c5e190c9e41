//! Tests for whole-file passes
//!
//! These tests verify:
//! - Compaction renumbers densely and keeps every value
//! - Bulk write and rewrite
//! - Copies (explicit and auto-named) keep stride and values
//! - Rename validation and relocation

use std::fs;
use std::path::PathBuf;

use slotstore::{RecordStore, SlotError, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store(stride: i32) -> (TempDir, PathBuf, RecordStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.dat");
    let store = RecordStore::create(stride, &path).unwrap();
    (temp_dir, path, store)
}

fn sorted_debug(values: &[Value]) -> Vec<String> {
    let mut out: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    out.sort();
    out
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_compact_renumbers() {
    let (_temp, _path, store) = setup_temp_store(32);
    store.write_at("A", 1).unwrap();
    store.write_at("B", 3).unwrap();

    assert_eq!(store.compact().unwrap(), 2);

    assert_eq!(store.read_at(1).unwrap(), Some(Value::from("A")));
    assert_eq!(store.read_at(2).unwrap(), Some(Value::from("B")));
    assert!(!store.has_record(3).unwrap());
}

#[test]
fn test_compact_preserves_multiset_and_removes_holes() {
    let (_temp, _path, store) = setup_temp_store(16);
    for i in 0..12 {
        store.append(i % 4).unwrap();
    }
    for index in [1, 2, 6, 7, 11] {
        store.delete_at(index).unwrap();
    }
    let before = store.read_all().unwrap();

    store.compact().unwrap();

    let after = store.read_all().unwrap();
    assert_eq!(sorted_debug(&before), sorted_debug(&after));
    assert_eq!(store.slot_count().unwrap(), 7);
    assert!(store.empty_slots().unwrap().is_empty());
}

#[test]
fn test_compact_empty_store() {
    let (_temp, path, store) = setup_temp_store(32);
    store.write_at(1, 2).unwrap();
    store.delete_at(2).unwrap();

    assert_eq!(store.compact().unwrap(), 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 4);
    assert_eq!(store.stride(), 32);
}

// =============================================================================
// Bulk Write Tests
// =============================================================================

#[test]
fn test_write_all_appends_after_last_slot() {
    let (_temp, _path, store) = setup_temp_store(32);
    store.write_at("x", 1).unwrap();
    store.write_at("y", 3).unwrap();
    store.delete_at(1).unwrap();

    let written = store.write_all(vec![Value::Int(1), Value::Int(2)]).unwrap();

    assert_eq!(written, 2);
    assert_eq!(store.read_at(4).unwrap(), Some(Value::Int(1)));
    assert_eq!(store.read_at(5).unwrap(), Some(Value::Int(2)));
    // holes are not filled by write_all
    assert!(!store.has_record(1).unwrap());
}

#[test]
fn test_write_all_stops_at_first_failure() {
    let (_temp, _path, store) = setup_temp_store(8);

    let result = store.write_all(vec![
        Value::from("ok"),
        Value::from("far too long"),
        Value::from("no"),
    ]);

    assert!(matches!(result, Err(SlotError::ValueTooLarge { .. })));
    assert_eq!(store.read_all().unwrap(), vec![Value::from("ok")]);
}

#[test]
fn test_rewrite_replaces_contents() {
    let (_temp, _path, store) = setup_temp_store(32);
    for value in ["a", "b", "c"] {
        store.append(value).unwrap();
    }

    store.rewrite([10i64, 20i64]).unwrap();

    assert_eq!(
        store.read_all().unwrap(),
        vec![Value::Long(10), Value::Long(20)]
    );
    assert_eq!(store.slot_count().unwrap(), 2);
}

// =============================================================================
// Copy Tests
// =============================================================================

#[test]
fn test_copy_to_new_path() {
    let (temp, _path, store) = setup_temp_store(24);
    store.write_at("A", 2).unwrap();
    store.write_at("B", 5).unwrap();

    let copy = store.copy_to(temp.path().join("backup.dat")).unwrap();

    assert_eq!(copy.path(), temp.path().join("backup.dat"));
    assert_eq!(copy.stride(), 24);
    assert_eq!(copy.read_at(1).unwrap(), Some(Value::from("A")));
    assert_eq!(copy.read_at(2).unwrap(), Some(Value::from("B")));
    // source untouched
    assert_eq!(store.read_at(5).unwrap(), Some(Value::from("B")));
}

#[test]
fn test_copy_to_existing_path_picks_sibling_name() {
    let (temp, _path, store) = setup_temp_store(32);
    store.append(7).unwrap();
    let taken = temp.path().join("backup.dat");
    fs::write(&taken, b"keep me").unwrap();

    let copy = store.copy_to(&taken).unwrap();

    assert_eq!(copy.path(), temp.path().join("backup - copy.dat"));
    assert_eq!(fs::read(&taken).unwrap(), b"keep me");
    assert_eq!(copy.read_all().unwrap(), vec![Value::Int(7)]);
}

#[test]
fn test_auto_named_copies() {
    let (temp, _path, store) = setup_temp_store(32);
    store.append(true).unwrap();

    let first = store.copy().unwrap();
    let second = store.copy().unwrap();

    assert_eq!(first.file_name(), Some("data - copy.dat"));
    assert_eq!(second.file_name(), Some("data - copy (2).dat"));
    assert!(temp.path().join("data - copy (2).dat").exists());
    assert_eq!(second.read_all().unwrap(), vec![Value::Bool(true)]);
}

// =============================================================================
// Rename Tests
// =============================================================================

#[test]
fn test_rename_moves_records() {
    let (temp, path, mut store) = setup_temp_store(32);
    store.write_at("A", 1).unwrap();
    store.write_at("B", 4).unwrap();

    store.rename("renamed").unwrap();

    assert!(!path.exists());
    assert_eq!(store.path(), temp.path().join("renamed.dat"));
    assert_eq!(store.file_name(), Some("renamed.dat"));
    assert_eq!(
        store.read_all().unwrap(),
        vec![Value::from("A"), Value::from("B")]
    );
    assert_eq!(store.read_at(2).unwrap(), Some(Value::from("B")));
}

#[test]
fn test_rename_keeps_dat_extension() {
    let (temp, _path, mut store) = setup_temp_store(32);
    store.rename("other.dat").unwrap();
    assert_eq!(store.path(), temp.path().join("other.dat"));
}

#[test]
fn test_rename_rejects_forbidden_names() {
    let (_temp, path, mut store) = setup_temp_store(32);
    store.append(1).unwrap();

    for name in ["a/b", "what?", "  ", "x|y", "c:d"] {
        let result = store.rename(name);
        assert!(matches!(result, Err(SlotError::InvalidPath(_))), "{:?}", name);
    }
    assert_eq!(store.path(), path);
    assert_eq!(store.read_all().unwrap(), vec![Value::Int(1)]);
}

#[test]
fn test_rename_refuses_existing_target() {
    let (temp, path, mut store) = setup_temp_store(32);
    store.append(1).unwrap();
    fs::write(temp.path().join("taken.dat"), b"x").unwrap();

    let result = store.rename("taken");

    assert!(matches!(result, Err(SlotError::InvalidPath(_))));
    assert_eq!(store.path(), path);
    assert!(path.exists());
}

#[test]
fn test_remove_file() {
    let (_temp, path, store) = setup_temp_store(32);
    assert!(store.remove_file().unwrap());
    assert!(!path.exists());
}
