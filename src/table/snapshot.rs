//! Binary snapshot of a whole store, encoded with bitcode.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Record, StoreError, Value};

const FORMAT_VERSION: u32 = 1;

static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

// bitcode is not self-describing, so values are stored in an explicitly
// tagged form rather than through `Value`'s scalar serde impl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum StoredValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&Value> for StoredValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => StoredValue::Null,
            Value::Bool(b) => StoredValue::Bool(*b),
            Value::Int(n) => StoredValue::Int(*n),
            Value::Float(x) => StoredValue::Float(*x),
            Value::Text(s) => StoredValue::Text(s.clone()),
        }
    }
}

impl From<StoredValue> for Value {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Null => Value::Null,
            StoredValue::Bool(b) => Value::Bool(b),
            StoredValue::Int(n) => Value::Int(n),
            StoredValue::Float(x) => Value::Float(x),
            StoredValue::Text(s) => Value::Text(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TableSnapshot {
    pub name: String,
    pub next_id: i64,
    rows: Vec<Vec<(String, StoredValue)>>,
}

impl TableSnapshot {
    pub(crate) fn new<'a>(
        name: impl Into<String>,
        next_id: i64,
        records: impl Iterator<Item = &'a Record>,
    ) -> Self {
        TableSnapshot {
            name: name.into(),
            next_id,
            rows: records
                .map(|r| r.iter().map(|(k, v)| (k.to_string(), v.into())).collect())
                .collect(),
        }
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreSnapshot {
    format: u32,
    pub tables: Vec<TableSnapshot>,
}

impl StoreSnapshot {
    pub(crate) fn new(tables: Vec<TableSnapshot>) -> Self {
        StoreSnapshot {
            format: FORMAT_VERSION,
            tables,
        }
    }

    /// Write to `path` via a sibling temp file and rename.
    ///
    /// Each call gets its own temp file, so saves racing on one path never
    /// rename each other's data away.
    pub(crate) fn save(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = bitcode::serialize(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(format!(
            ".{}-{}.tmp",
            std::process::id(),
            NEXT_TEMP.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            tables = self.tables.len(),
            bytes = bytes.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Read a snapshot. Returns None if the file does not exist.
    pub(crate) fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: StoreSnapshot = bitcode::deserialize(&bytes)?;
        if snapshot.format != FORMAT_VERSION {
            return Err(StoreError::Snapshot(format!(
                "unsupported snapshot format {} (expected {})",
                snapshot.format, FORMAT_VERSION
            )));
        }

        info!(
            path = %path.display(),
            tables = snapshot.tables.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tablestore-{}-{}.snap", name, std::process::id()))
    }

    #[test]
    fn save_and_load() {
        let path = temp_path("snapshot-unit");
        let rows = [record! { "id" => 1, "name" => "Ada", "score" => 1.5, "admin" => true }];
        let snapshot = StoreSnapshot::new(vec![TableSnapshot::new("Users", 2, rows.iter())]);

        snapshot.save(&path).unwrap();
        let loaded = StoreSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        let table = loaded.tables.into_iter().next().unwrap();
        assert_eq!(table.next_id, 2);
        assert_eq!(table.into_records(), rows.to_vec());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn concurrent_saves_to_one_path_all_succeed() {
        let path = temp_path("snapshot-race");
        let rows: Vec<_> = (0..2000).map(|n| record! { "id" => n, "name" => "row" }).collect();
        let snapshot = StoreSnapshot::new(vec![TableSnapshot::new("Users", 2000, rows.iter())]);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| snapshot.save(&path)))
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        assert_eq!(StoreSnapshot::load(&path).unwrap().unwrap(), snapshot);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = std::env::temp_dir().join(format!("tablestore-absent-{}", std::process::id()));
        let path = dir.join("store.snap");
        let err = StoreSnapshot::new(Vec::new()).save(&path).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn missing_file_is_none() {
        let path = temp_path("snapshot-missing");
        assert!(StoreSnapshot::load(&path).unwrap().is_none());
    }

    #[test]
    fn garbage_file_is_an_error() {
        let path = temp_path("snapshot-garbage");
        fs::write(&path, b"not a snapshot").unwrap();
        let err = StoreSnapshot::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
        fs::remove_file(&path).unwrap();
    }
}
