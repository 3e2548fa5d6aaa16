//! TableStore - Abstract CRUD access to named tables.

use std::collections::BTreeMap;

use super::DeleteOutcome;
use crate::{Filter, Key, Projection, Record, StoreConfig, StoreError};

/// Abstract CRUD storage over named, schema-less tables.
///
/// Implementations must serialize mutations per table so that key
/// uniqueness and existence checks are race-free.
pub trait TableStore: Send + Sync {
    /// The configuration this store was opened with.
    fn config(&self) -> &StoreConfig;

    /// Create an empty table. Creating an existing table is a no-op.
    fn create_table(&self, table: &str) -> Result<(), StoreError>;

    /// Names of all known tables, sorted.
    fn table_names(&self) -> Result<Vec<String>, StoreError>;

    /// Every record in `table`, in insertion order.
    fn select_all(&self, table: &str, projection: &Projection) -> Result<Vec<Record>, StoreError> {
        self.select(table, projection, &Filter::new())
    }

    /// Every record matching `filter`, in insertion order.
    fn select(
        &self,
        table: &str,
        projection: &Projection,
        filter: &Filter,
    ) -> Result<Vec<Record>, StoreError>;

    /// The first record matching `filter`. Returns None if nothing matches.
    fn select_one(
        &self,
        table: &str,
        projection: &Projection,
        filter: &Filter,
    ) -> Result<Option<Record>, StoreError>;

    /// Insert a record, assigning the next sequential key when the primary
    /// key is absent or null. Fails if the key already exists.
    fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Update the record identified by the primary key inside `record`.
    fn update_by_id(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Delete records by primary key.
    fn delete_by_id(&self, table: &str, ids: &[Key]) -> Result<DeleteOutcome, StoreError>;

    /// Contents of every table keyed by name.
    ///
    /// Tables are read one after another, so concurrent writers may leave
    /// the result showing some tables before and others after a change.
    fn combine_all_tables(&self) -> Result<BTreeMap<String, Vec<Record>>, StoreError>;
}
