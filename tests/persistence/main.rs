//! Snapshot persistence across open/close.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Barrier;
use std::thread;

use tablestore::{
    record, Filter, InMemoryTableStore, Projection, StoreConfig, StoreError, TableStore, Value,
};

static NEXT_FILE: AtomicU64 = AtomicU64::new(1);

fn snapshot_path() -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "tablestore-persistence-{}-{}.snap",
        std::process::id(),
        n
    ))
}

#[test]
fn close_then_open_restores_tables() {
    let path = snapshot_path();
    let config = StoreConfig::new().with_snapshot_path(&path);

    let store = InMemoryTableStore::open(config.clone()).unwrap();
    store
        .insert("Users", record! { "name" => "Ada", "score" => 9.5, "admin" => true })
        .unwrap();
    store
        .insert("Users", record! { "name" => "Grace", "email" => Value::Null })
        .unwrap();
    store.create_table("Empty").unwrap();
    store.close().unwrap();
    assert!(path.exists());

    let reopened = InMemoryTableStore::open(config).unwrap();
    assert_eq!(reopened.table_names().unwrap(), vec!["Empty", "Users"]);

    let ada = reopened
        .select_one("Users", &Projection::All, &Filter::by("id", 1))
        .unwrap()
        .unwrap();
    assert_eq!(ada, record! { "id" => 1, "name" => "Ada", "score" => 9.5, "admin" => true });

    // The key sequence continues where it left off.
    let next = reopened.insert("Users", record! { "name" => "Alan" }).unwrap();
    assert_eq!(next.get("id"), Some(&Value::Int(3)));

    fs::remove_file(&path).unwrap();
}

#[test]
fn deleted_rows_do_not_reuse_keys_after_reopen() {
    let path = snapshot_path();
    let config = StoreConfig::new().with_snapshot_path(&path);

    let store = InMemoryTableStore::open(config.clone()).unwrap();
    store.insert("Users", record! { "name" => "Ada" }).unwrap();
    store.insert("Users", record! { "name" => "Grace" }).unwrap();
    store.delete_by_id("Users", &[2.into()]).unwrap();
    store.flush().unwrap();

    let reopened = InMemoryTableStore::open(config).unwrap();
    let next = reopened.insert("Users", record! { "name" => "Alan" }).unwrap();
    assert_eq!(next.get("id"), Some(&Value::Int(3)));

    fs::remove_file(&path).unwrap();
}

#[test]
fn open_without_snapshot_file_starts_empty() {
    let path = snapshot_path();
    let store = InMemoryTableStore::open(StoreConfig::new().with_snapshot_path(&path)).unwrap();
    assert!(store.combine_all_tables().unwrap().is_empty());
    assert!(!path.exists());
}

#[test]
fn corrupt_snapshot_fails_to_open() {
    let path = snapshot_path();
    fs::write(&path, [0xff; 3]).unwrap();

    let err = InMemoryTableStore::open(StoreConfig::new().with_snapshot_path(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Snapshot(_)));

    fs::remove_file(&path).unwrap();
}

#[test]
fn close_without_snapshot_path_only_closes() {
    let store = InMemoryTableStore::new();
    store.insert("Users", record! { "name" => "Ada" }).unwrap();
    store.close().unwrap();
    assert!(store.is_closed());
    assert_eq!(
        store.insert("Users", record! { "name" => "late" }).unwrap_err(),
        StoreError::Closed
    );
}

#[test]
fn failed_close_keeps_store_open() {
    let dir = std::env::temp_dir().join(format!(
        "tablestore-missing-dir-{}-{}",
        std::process::id(),
        NEXT_FILE.fetch_add(1, Ordering::Relaxed)
    ));
    let path = dir.join("store.snap");
    let store = InMemoryTableStore::open(StoreConfig::new().with_snapshot_path(&path)).unwrap();
    let other = store.clone();
    store.insert("Users", record! { "name" => "Ada" }).unwrap();

    assert!(matches!(store.close().unwrap_err(), StoreError::Snapshot(_)));
    assert!(!other.is_closed());
    assert!(matches!(store.close().unwrap_err(), StoreError::Snapshot(_)));
    assert!(matches!(other.flush().unwrap_err(), StoreError::Snapshot(_)));
    other.insert("Users", record! { "name" => "Grace" }).unwrap();

    // Once the directory exists the same handle closes cleanly with all rows.
    fs::create_dir_all(&dir).unwrap();
    store.close().unwrap();
    assert!(other.is_closed());

    let reopened = InMemoryTableStore::open(StoreConfig::new().with_snapshot_path(&path)).unwrap();
    assert_eq!(reopened.select_all("Users", &Projection::All).unwrap().len(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn concurrent_flushes_from_cloned_handles() {
    const THREADS: usize = 8;
    let path = snapshot_path();
    let config = StoreConfig::new().with_snapshot_path(&path);
    let store = InMemoryTableStore::open(config.clone()).unwrap();
    for n in 0..5000 {
        store.insert("Users", record! { "name" => "user", "n" => n }).unwrap();
    }

    for _ in 0..5 {
        let barrier = Barrier::new(THREADS);
        thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let store = store.clone();
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        store.flush()
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        let reopened = InMemoryTableStore::open(config.clone()).unwrap();
        assert_eq!(reopened.select_all("Users", &Projection::All).unwrap().len(), 5000);
    }

    fs::remove_file(&path).unwrap();
}
