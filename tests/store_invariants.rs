//! Record Store Invariant Tests
//!
//! - `norad_catalog` and `intldes` are each unique
//! - Rejected mutations leave the table unchanged
//! - Range reflects the stored extremes
//! - Racing adds of the same object yield exactly one success
//! - File-backed readers see committed rows

use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use tempfile::TempDir;
use tledb::query::PredicateBuilder;
use tledb::schema::SchemaRegistry;
use tledb::store::{AddPayload, LoadMode, RecordStore, StoreConfig, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

const ISS: [&str; 3] = [
    "ISS (ZARYA)",
    "1 25544U 98067A   19128.56248153  .00016717  00000-0  10270-3 0  9002",
    "2 25544  51.6390 198.1271 0001239 315.7000  44.4052 15.52641749  9097",
];

const HST: [&str; 3] = [
    "HST",
    "1 20580U 90037B   19128.83784446  .00000592  00000-0  24021-4 0  9994",
    "2 20580  28.4698 289.4472 0002720 118.0262  16.0162 15.09298018398777",
];

const GPS: [&str; 3] = [
    "GPS BIIR-2  (PRN 13)",
    "1 24876U 97035A   19128.00000000 -.00000012  00000-0  00000-0 0  9990",
    "2 24876  55.4472 148.8860 0043410  53.3100 307.1700  2.00563230159941",
];

fn payload(tle: [&str; 3]) -> AddPayload {
    AddPayload::parse(&json!(tle), false).unwrap()
}

fn setup_file_store() -> (TempDir, Arc<RecordStore>) {
    let tmp = TempDir::new().unwrap();
    let config = StoreConfig::file(tmp.path().join("tles.sqlite")).with_read_pool_size(2);
    let store = Arc::new(RecordStore::open(config).unwrap());
    (tmp, store)
}

// =============================================================================
// Uniqueness
// =============================================================================

#[test]
fn test_duplicate_catalog_number_rejected() {
    let store = RecordStore::open_in_memory().unwrap();
    store.add(&payload(ISS)).unwrap();

    let result = store.add(&payload(ISS));
    assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_duplicate_intldes_rejected() {
    let store = RecordStore::open_in_memory().unwrap();
    store.add(&payload(ISS)).unwrap();

    // new catalog number, same international designator
    let line1 = ISS[1].replacen("25544", "25545", 1);
    let line2 = ISS[2].replacen("25544", "25545", 1);
    let clash = AddPayload::parse(&json!(["ISS COPY", line1, line2]), false).unwrap();

    assert!(matches!(
        store.add(&clash),
        Err(StoreError::DuplicateKey { norad_catalog: 25545, .. })
    ));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_malformed_add_writes_nothing() {
    let store = RecordStore::open_in_memory().unwrap();
    let truncated = AddPayload::parse(&json!(["ISS", ISS[1], &ISS[2][..60]]), false).unwrap();

    assert!(matches!(
        store.add(&truncated),
        Err(StoreError::MalformedPayload(_))
    ));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_non_finite_elements_rejected_before_write() {
    let store = RecordStore::open_in_memory().unwrap();
    let before = store.metrics().store_calls();
    let line2 = ISS[2].replacen("15.52641749", &format!("{:>11}", "NaN"), 1);
    let nan_motion = AddPayload::parse(&json!([ISS[0], ISS[1], line2]), false).unwrap();

    match store.add(&nan_motion) {
        Err(StoreError::MalformedPayload(reason)) => {
            assert!(reason.contains("mean_motion"), "{}", reason)
        }
        other => panic!("expected MalformedPayload, got {:?}", other),
    }
    assert_eq!(store.metrics().store_calls(), before);
    assert_eq!(store.count().unwrap(), 0);
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_missing_is_not_found() {
    let store = RecordStore::open_in_memory().unwrap();
    store.add(&payload(ISS)).unwrap();

    assert!(matches!(
        store.delete("norad_catalog", "20580"),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_delete_removes_exactly_one() {
    let store = RecordStore::open_in_memory().unwrap();
    store.add(&payload(ISS)).unwrap();
    store.add(&payload(HST)).unwrap();

    store.delete("norad_catalog", "25544").unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert!(store.get(25544).unwrap().is_none());
    assert!(store.get(20580).unwrap().is_some());
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_added_record_is_searchable() {
    let store = RecordStore::open_in_memory().unwrap();
    let added = store.add(&payload(ISS)).unwrap();

    let registry = SchemaRegistry::tles();
    let predicate = PredicateBuilder::new(&registry)
        .build("norad_catalog", "eq", &["25544"])
        .unwrap();
    let found = store.search(&predicate).unwrap();

    assert_eq!(found, vec![added]);
    assert_eq!(found[0].line1, ISS[1]);
    assert_eq!(found[0].line2, ISS[2]);
}

// =============================================================================
// Range
// =============================================================================

#[test]
fn test_range_tracks_extremes() {
    let store = RecordStore::open_in_memory().unwrap();
    let iss = store.add(&payload(ISS)).unwrap();
    let hst = store.add(&payload(HST)).unwrap();

    let period = &store.range(Some("period")).unwrap()["period"];
    assert_eq!(period.min, json!(iss.period));
    assert_eq!(period.max, json!(hst.period));

    // a new maximum moves only the upper bound
    let gps = store.add(&payload(GPS)).unwrap();
    let period = &store.range(Some("period")).unwrap()["period"];
    assert_eq!(period.min, json!(iss.period));
    assert_eq!(period.max, json!(gps.period));

    // removing the maximum restores the previous one
    store.delete("intldes", "97035A").unwrap();
    let period = &store.range(Some("period")).unwrap()["period"];
    assert_eq!(period.max, json!(hst.period));
}

#[test]
fn test_range_column_ignores_case() {
    let store = RecordStore::open_in_memory().unwrap();
    let iss = store.add(&payload(ISS)).unwrap();

    let ranges = store.range(Some("NAME")).unwrap();
    assert_eq!(ranges["name"].min, json!(iss.name));
    assert!(matches!(
        store.range(Some("LINE1")),
        Err(StoreError::UnknownColumn(_))
    ));
}

#[test]
fn test_range_empty_table_is_null() {
    let store = RecordStore::open_in_memory().unwrap();
    let ranges = store.range(None).unwrap();
    assert!(!ranges.is_empty());
    assert!(ranges
        .values()
        .all(|r| r.min == Value::Null && r.max == Value::Null));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_racing_adds_yield_one_success() {
    let (_tmp, store) = setup_file_store();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add(&payload(ISS)))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::DuplicateKey { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_readers_see_committed_rows() {
    let (_tmp, store) = setup_file_store();
    store.add(&payload(ISS)).unwrap();

    // round-robin touches every reader connection
    for _ in 0..4 {
        assert_eq!(store.count().unwrap(), 1);
    }
}

#[test]
fn test_reopen_keeps_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tles.sqlite");

    let store = RecordStore::open(StoreConfig::file(&path)).unwrap();
    store.add(&payload(ISS)).unwrap();
    store.close().unwrap();

    let store = RecordStore::open(StoreConfig::file(&path)).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

// =============================================================================
// Bulk Load
// =============================================================================

#[test]
fn test_bulk_load_counts_rejects() {
    let store = RecordStore::open_in_memory().unwrap();
    store.add(&payload(ISS)).unwrap();

    let records: Vec<_> = [ISS, HST, GPS]
        .into_iter()
        .map(|tle| payload(tle).to_record().unwrap())
        .collect();
    let summary = store.bulk_load(&records, LoadMode::InsertOnly).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].label, "25544");
    assert_eq!(store.count().unwrap(), 3);
}
