//! Tests for free-slot reuse and scans
//!
//! These tests verify:
//! - First-fit selection in append
//! - Empty-slot enumeration
//! - Scan order, restartability and stability
//! - Appends from several threads sharing one store

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use slotstore::{RecordStore, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store(stride: i32) -> (TempDir, PathBuf, RecordStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("free.dat");
    let store = RecordStore::create(stride, &path).unwrap();
    (temp_dir, path, store)
}

/// Store holding `A` at 1, nothing at 2, `B` at 3
fn store_with_hole() -> (TempDir, PathBuf, RecordStore) {
    let (temp, path, store) = setup_temp_store(32);
    store.write_at("A", 1).unwrap();
    store.write_at("B", 3).unwrap();
    (temp, path, store)
}

// =============================================================================
// First-fit Tests
// =============================================================================

#[test]
fn test_append_to_empty_store_uses_slot_one() {
    let (_temp, _path, store) = setup_temp_store(32);
    assert_eq!(store.append(1).unwrap(), 1);
    assert_eq!(store.append(2).unwrap(), 2);
    assert_eq!(store.append(3).unwrap(), 3);
}

#[test]
fn test_append_fills_lowest_hole() {
    let (_temp, _path, store) = store_with_hole();
    assert_eq!(store.append("C").unwrap(), 2);
    assert_eq!(store.append("D").unwrap(), 4);
}

#[test]
fn test_append_reuses_deleted_slot() {
    let (_temp, _path, store) = setup_temp_store(32);
    store.write_at("hi", 1).unwrap();
    assert!(store.has_record(1).unwrap());
    assert_eq!(store.read_at(1).unwrap(), Some(Value::from("hi")));

    store.delete_at(1).unwrap();
    assert!(!store.has_record(1).unwrap());

    assert_eq!(store.append(42).unwrap(), 1);
    assert!(matches!(
        store.write_at(2.5, 1),
        Err(slotstore::SlotError::SlotOccupied { index: 1 })
    ));
}

#[test]
fn test_append_never_picks_occupied_slot() {
    let (_temp, _path, store) = setup_temp_store(16);
    for i in 0..10 {
        store.append(i).unwrap();
    }
    for index in [2, 5, 9] {
        store.delete_at(index).unwrap();
    }

    let occupied_before: HashSet<u32> = store.scan().unwrap().map(|(i, _)| i).collect();
    for _ in 0..4 {
        let index = store.append(100).unwrap();
        assert!(!occupied_before.contains(&index));
    }
}

#[test]
fn test_append_with_header_sized_stride() {
    // slot 1 starts right where the header ends
    let (_temp, _path, store) = setup_temp_store(4);
    assert_eq!(store.append(true).unwrap(), 1);
    assert_eq!(store.append(false).unwrap(), 2);
    assert_eq!(
        store.read_all().unwrap(),
        vec![Value::Bool(true), Value::Bool(false)]
    );
}

// =============================================================================
// Empty Slot Tests
// =============================================================================

#[test]
fn test_empty_slots_lists_holes() {
    let (_temp, _path, store) = store_with_hole();
    assert_eq!(store.empty_slots().unwrap(), vec![2]);

    store.delete_at(1).unwrap();
    assert_eq!(store.empty_slots().unwrap(), vec![1, 2]);
}

#[test]
fn test_empty_slots_on_fresh_store() {
    let (_temp, _path, store) = setup_temp_store(32);
    assert!(store.empty_slots().unwrap().is_empty());
}

#[test]
fn test_free_slots_iterator_matches_has_record() {
    let (_temp, _path, store) = setup_temp_store(16);
    store.write_at(1, 2).unwrap();
    store.write_at(1, 6).unwrap();

    for index in store.free_slots().unwrap() {
        assert!(!store.has_record(index).unwrap());
    }
    assert_eq!(store.empty_slots().unwrap(), vec![1, 3, 4, 5]);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_skips_holes() {
    let (_temp, _path, store) = store_with_hole();
    let scanned: Vec<(u32, Value)> = store.scan().unwrap().collect();
    assert_eq!(
        scanned,
        vec![(1, Value::from("A")), (3, Value::from("B"))]
    );
}

#[test]
fn test_scan_matches_has_record() {
    let (_temp, _path, store) = setup_temp_store(16);
    for index in [1, 4, 5, 8] {
        store.write_at(index as i64, index).unwrap();
    }
    store.delete_at(5).unwrap();

    let scanned: Vec<u32> = store.scan().unwrap().map(|(i, _)| i).collect();
    let expected: Vec<u32> = (1..=store.slot_count().unwrap())
        .filter(|&i| store.has_record(i).unwrap())
        .collect();
    assert_eq!(scanned, expected);
    assert_eq!(scanned, vec![1, 4, 8]);
}

#[test]
fn test_scan_is_restartable_and_stable() {
    let (_temp, _path, store) = store_with_hole();

    let first: Vec<_> = store.scan().unwrap().collect();
    let second: Vec<_> = store.scan().unwrap().collect();
    assert_eq!(first, second);

    let mut scan = store.scan().unwrap();
    assert_eq!(scan.next(), Some((1, Value::from("A"))));
    drop(scan);
    assert_eq!(store.scan().unwrap().next(), Some((1, Value::from("A"))));
}

#[test]
fn test_scan_bounded_at_creation() {
    let (_temp, _path, store) = store_with_hole();
    let scan = store.scan().unwrap();
    store.write_at("late", 10).unwrap();

    let values: Vec<Value> = scan.map(|(_, v)| v).collect();
    assert_eq!(values, vec![Value::from("A"), Value::from("B")]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_appends_get_distinct_slots() {
    let (_temp, _path, store) = setup_temp_store(16);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|i| store.append(t * 100 + i).unwrap())
                    .collect::<Vec<u32>>()
            })
        })
        .collect();

    let mut indices = HashSet::new();
    for handle in handles {
        for index in handle.join().unwrap() {
            assert!(indices.insert(index), "slot {} handed out twice", index);
        }
    }

    assert_eq!(indices.len(), 100);
    assert_eq!(store.read_all().unwrap().len(), 100);
}
