use serde_json::json;

use super::test_db;
use crate::{CREDENTIALS_KEY, Credentials, Database, StoreError};

fn creds(blob: serde_json::Value) -> Credentials {
    Credentials::try_from(blob).unwrap()
}

#[test]
fn test_credentials_absent_by_default() {
    let db = test_db();
    assert!(db.load_credentials().unwrap().is_none());
}

#[test]
fn test_credentials_replaced_wholesale() {
    let db = test_db();
    let first = creds(json!({ "fcm": { "token": "token-1" }, "gcm": { "androidId": "12345" } }));
    db.save_credentials(&first).unwrap();
    assert_eq!(db.load_credentials().unwrap(), Some(first));

    let second = creds(json!({ "fcm": { "token": "token-2" } }));
    db.save_credentials(&second).unwrap();
    let loaded = db.load_credentials().unwrap().unwrap();
    assert_eq!(loaded.token(), Some("token-2"));
    assert!(!loaded.as_map().contains_key("gcm"));
}

#[test]
fn test_backend_blob_loads_untouched() {
    let db = test_db();
    let blob = json!({
        "fcm": { "token": "abc" },
        "gcm": { "androidId": "1", "securityToken": "2" },
        "keys": { "auth": "x" }
    });
    db.kv_set(CREDENTIALS_KEY, &blob).unwrap();

    let loaded = db.load_credentials().unwrap().unwrap();
    assert_eq!(loaded.token(), Some("abc"));
    assert_eq!(serde_json::to_value(&loaded).unwrap(), blob);
}

#[test]
fn test_blob_without_token_is_kept() {
    let db = test_db();
    let blob = creds(json!({ "gcm": { "androidId": "1" } }));
    db.save_credentials(&blob).unwrap();

    let loaded = db.load_credentials().unwrap().unwrap();
    assert_eq!(loaded.token(), None);
    assert_eq!(loaded.redacted_token(), "<no token>");
}

#[test]
fn test_empty_or_non_object_rejected() {
    let db = test_db();
    let err = db.save_credentials(&creds(json!({}))).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
    assert!(db.load_credentials().unwrap().is_none());

    assert!(matches!(
        Credentials::try_from(json!("just-a-token")),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn test_credentials_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");
    {
        let db = Database::open(&path).unwrap();
        db.save_credentials(&creds(json!({ "fcm": { "token": "persisted" } })))
            .unwrap();
        db.flush().unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(
        db.load_credentials().unwrap().unwrap().token(),
        Some("persisted")
    );
}

#[test]
fn test_redacted_token() {
    let fcm = creds(json!({ "fcm": { "token": "abcdefghijklmnop" } }));
    assert_eq!(fcm.redacted_token(), "abcdefgh***");
    let flat = creds(json!({ "token": "zyxwvutsrq" }));
    assert_eq!(flat.redacted_token(), "zyxwvuts***");
}
