use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::test_db;
use crate::{Database, DeliveredIdSet, PERSISTENT_IDS_KEY};

#[test]
fn test_set_keeps_insertion_order_without_duplicates() {
    let mut set = DeliveredIdSet::new();
    assert!(set.insert("b"));
    assert!(set.insert("a"));
    assert!(!set.insert("b"));
    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_set_serializes_as_array() {
    let set: DeliveredIdSet = vec!["x".to_string(), "y".to_string(), "x".to_string()].into();
    assert_eq!(serde_json::to_value(&set).unwrap(), serde_json::json!(["x", "y"]));
}

#[test]
fn test_record_delivered() {
    let db = test_db();
    assert!(db.load_delivered_ids().unwrap().is_empty());

    assert!(db.record_delivered("m1").unwrap());
    assert!(!db.record_delivered("m1").unwrap());
    assert!(db.record_delivered("m2").unwrap());

    assert!(db.is_delivered("m1").unwrap());
    assert!(!db.is_delivered("m3").unwrap());
    assert_eq!(db.load_delivered_ids().unwrap().to_vec(), vec!["m1", "m2"]);
}

#[test]
fn test_record_delivered_rejects_empty_id() {
    let db = test_db();
    assert!(db.record_delivered("").is_err());
    assert!(db.load_delivered_ids().unwrap().is_empty());
}

#[test]
fn test_reads_legacy_plain_array() {
    let db = test_db();
    db.kv_set(PERSISTENT_IDS_KEY, &vec!["0:1", "0:2"]).unwrap();
    let set = db.load_delivered_ids().unwrap();
    assert!(set.contains("0:1"));
    assert!(set.contains("0:2"));
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let db = test_db();
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let db = db.clone();
            scope.spawn(move || {
                for n in 0..25 {
                    db.record_delivered(&format!("w{worker}-{n}")).unwrap();
                }
            });
        }
    });
    assert_eq!(db.load_delivered_ids().unwrap().len(), 200);
}

#[test]
fn test_set_only_grows_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");
    let mut rng = rand::thread_rng();
    let mut pool: Vec<String> = (0..60).map(|n| format!("0:{n}")).collect();
    pool.shuffle(&mut rng);

    let mut processed = HashSet::new();
    let mut db = Database::open(&path).unwrap();
    for id in &pool {
        if rng.gen_bool(0.2) {
            drop(db);
            db = Database::open(&path).unwrap();
        }
        db.record_delivered(id).unwrap();
        processed.insert(id.clone());

        let stored = db.load_delivered_ids().unwrap();
        assert!(processed.iter().all(|seen| stored.contains(seen)));
    }
    assert_eq!(db.load_delivered_ids().unwrap().len(), pool.len());
}
