use std::fmt;

use crate::Key;

/// Error type for table store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The referenced table does not exist (explicit table policy only).
    TableNotFound { table: String },
    /// One or more primary keys do not exist in the table.
    NotFound { table: String, ids: Vec<Key> },
    /// Insert collided with an existing primary key.
    DuplicateKey { table: String, id: Key },
    /// Malformed record, filter or key.
    Validation(String),
    /// Row (de)serialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
    /// Snapshot file could not be read or written.
    Snapshot(String),
    /// The store has been closed.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TableNotFound { table } => write!(f, "table not found: {}", table),
            StoreError::NotFound { table, ids } => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "record not found in {}: {}", table, ids.join(", "))
            }
            StoreError::DuplicateKey { table, id } => {
                write!(f, "duplicate primary key in {}: {}", table, id)
            }
            StoreError::Validation(msg) => write!(f, "validation error: {}", msg),
            StoreError::Serde(msg) => write!(f, "row serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "storage error: {}", msg),
            StoreError::Snapshot(msg) => write!(f, "snapshot error: {}", msg),
            StoreError::Closed => write!(f, "store is closed"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<bitcode::Error> for StoreError {
    fn from(err: bitcode::Error) -> Self {
        StoreError::Snapshot(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Snapshot(err.to_string())
    }
}
