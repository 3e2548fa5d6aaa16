//! Integration tests for typed rows (Row derive + TablesExt).

mod models;

use models::{AuditEntry, User};
use serde_json::json;
use tablestore::resolvers;
use tablestore::{Filter, InMemoryTableStore, Key, Row, StoreError, TableStore, TablesExt};

#[test]
fn derive_sets_table_names() {
    assert_eq!(User::TABLE, "Users");
    assert_eq!(AuditEntry::TABLE, "audit_entrys");
}

#[test]
fn typed_rows_share_tables_with_resolvers() {
    let store = InMemoryTableStore::new();

    let ada = store.rows::<User>().insert(&User::new("Ada")).unwrap();
    assert_eq!(ada.id, Some(1));

    // Rows written through the typed API are visible to the JSON resolvers.
    assert_eq!(
        resolvers::user(&store, &json!(1)).unwrap(),
        Some(json!({ "id": 1, "name": "Ada", "email": null }))
    );

    resolvers::update_user(&store, &json!({ "id": 1, "email": "ada@example.com" })).unwrap();
    let loaded = store.rows::<User>().get(1).unwrap().unwrap();
    assert_eq!(loaded.email.as_deref(), Some("ada@example.com"));
    assert_eq!(loaded.name, "Ada");
}

#[test]
fn string_keyed_rows() {
    let store = InMemoryTableStore::new();
    let audit = store.rows::<AuditEntry>();

    audit
        .insert(&AuditEntry {
            id: "login-1".into(),
            action: "login".into(),
        })
        .unwrap();
    audit
        .insert(&AuditEntry {
            id: "logout-1".into(),
            action: "logout".into(),
        })
        .unwrap();

    let logins = audit.find(&Filter::by("action", "login")).unwrap();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].id, "login-1");

    let err = audit
        .insert(&AuditEntry {
            id: "login-1".into(),
            action: "again".into(),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { .. }));

    let outcome = audit.delete(&[Key::from("login-1")]).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(audit.all().unwrap().len(), 1);
    assert_eq!(store.table_names().unwrap(), vec!["audit_entrys"]);
}

#[test]
fn updating_missing_row_fails() {
    let store = InMemoryTableStore::new();
    let mut ghost = User::new("Ghost");
    ghost.id = Some(42);

    let err = store.rows::<User>().update(&ghost).unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            table: "Users".into(),
            ids: vec![Key::Int(42)],
        }
    );
}
