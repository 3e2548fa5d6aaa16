//! Row types for the typed repository tests.

use serde::{Deserialize, Serialize};
use tablestore::Row;

/// A user row; the id is assigned by the store on insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Row)]
#[row(table = "Users")]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: None,
        }
    }
}

/// Keyed by a caller-chosen slug; table name defaults to `audit_entrys`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Row)]
pub struct AuditEntry {
    pub id: String,
    pub action: String,
}
