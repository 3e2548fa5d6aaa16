//! Tables - generic CRUD over named, schema-less tables.
//!
//! A [`TableStore`] addresses data by table name and primary key only; it
//! carries no per-table logic. [`InMemoryTableStore`] is the bundled
//! implementation, with optional snapshot persistence and change
//! notifications.
//!
//! ## Example
//!
//! ```
//! use tablestore::{record, Filter, InMemoryTableStore, Projection, TableStore};
//!
//! let store = InMemoryTableStore::new();
//! store.insert("Users", record! { "id" => 1, "name" => "Ada" })?;
//!
//! let ada = store.select_one("Users", &Projection::All, &Filter::by("id", 1))?;
//! assert_eq!(ada, Some(record! { "id" => 1, "name" => "Ada" }));
//! # Ok::<(), tablestore::StoreError>(())
//! ```

mod in_memory;
mod notify;
mod snapshot;
mod storage;
mod store;

use serde::{Deserialize, Serialize};

use crate::{Key, Value};

/// Result of a `delete_by_id` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Keys that were removed, in request order.
    pub deleted: Vec<Key>,
    /// Keys that did not exist. Always empty under `DeletePolicy::AllOrNothing`.
    pub missing: Vec<Key>,
}

impl DeleteOutcome {
    /// True if every requested key was removed.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub(crate) fn deleted_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.deleted
                .iter()
                .map(|key| Value::from(key.clone()).to_json())
                .collect(),
        )
    }
}

pub use in_memory::InMemoryTableStore;
pub use notify::ChangeKind;
pub use store::TableStore;
