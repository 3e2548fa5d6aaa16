//! TableRepository - Typed accessor for one table.

use std::marker::PhantomData;

use super::Row;
use crate::{DeleteOutcome, Filter, Key, Projection, Record, StoreError, TableStore};

/// Typed repository wrapper for accessing rows of a specific type.
///
/// Converts between `R` and [`Record`] with serde_json and delegates to the
/// underlying `TableStore`.
pub struct TableRepository<'a, S, R> {
    store: &'a S,
    _marker: PhantomData<R>,
}

impl<'a, S: TableStore, R: Row> TableRepository<'a, S, R> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// All rows in insertion order.
    pub fn all(&self) -> Result<Vec<R>, StoreError> {
        self.store
            .select_all(R::TABLE, &Projection::All)?
            .iter()
            .map(decode)
            .collect()
    }

    /// Get a row by primary key.
    pub fn get(&self, id: impl Into<Key>) -> Result<Option<R>, StoreError> {
        let filter = Filter::by(self.store.config().primary_key.clone(), id.into());
        self.find_one(&filter)
    }

    /// Rows matching `filter`.
    pub fn find(&self, filter: &Filter) -> Result<Vec<R>, StoreError> {
        self.store
            .select(R::TABLE, &Projection::All, filter)?
            .iter()
            .map(decode)
            .collect()
    }

    /// The first row matching `filter`.
    pub fn find_one(&self, filter: &Filter) -> Result<Option<R>, StoreError> {
        self.store
            .select_one(R::TABLE, &Projection::All, filter)?
            .as_ref()
            .map(decode)
            .transpose()
    }

    /// Insert a row and return it as stored, including an assigned key.
    pub fn insert(&self, row: &R) -> Result<R, StoreError> {
        decode(&self.store.insert(R::TABLE, encode(row)?)?)
    }

    /// Update the stored row with the same primary key.
    pub fn update(&self, row: &R) -> Result<R, StoreError> {
        decode(&self.store.update_by_id(R::TABLE, encode(row)?)?)
    }

    /// Delete rows by primary key.
    pub fn delete(&self, ids: &[Key]) -> Result<DeleteOutcome, StoreError> {
        self.store.delete_by_id(R::TABLE, ids)
    }
}

fn encode<R: Row>(row: &R) -> Result<Record, StoreError> {
    let json = serde_json::to_value(row).map_err(|e| StoreError::Serde(e.to_string()))?;
    Record::from_json(&json)
}

fn decode<R: Row>(record: &Record) -> Result<R, StoreError> {
    serde_json::from_value(record.to_json()).map_err(|e| StoreError::Serde(e.to_string()))
}

/// Extension trait for typed row access on any TableStore.
pub trait TablesExt: TableStore + Sized {
    /// Get a typed table repository.
    fn rows<R: Row>(&self) -> TableRepository<'_, Self, R> {
        TableRepository::new(self)
    }
}

impl<S: TableStore> TablesExt for S {}
