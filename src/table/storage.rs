//! Rows of a single table, indexed by primary key.

use std::collections::{HashMap, HashSet};

use crate::{DeleteOutcome, Key, Record, StoreError, UpdateMode, Value};

#[derive(Debug)]
struct Entry {
    key: Key,
    record: Record,
}

/// One named table: rows in insertion order plus a key index.
///
/// All methods assume the caller holds the table's lock.
#[derive(Debug)]
pub(crate) struct Table {
    name: String,
    entries: Vec<Entry>,
    index: HashMap<Key, usize>,
    next_id: i64,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild a table from persisted rows, re-validating every key.
    pub(crate) fn restore(
        name: impl Into<String>,
        primary_key: &str,
        next_id: i64,
        rows: Vec<Record>,
    ) -> Result<Self, StoreError> {
        let mut table = Table::new(name);
        table.next_id = next_id.max(1);
        for record in rows {
            let key = match record.get(primary_key) {
                Some(value) => Key::try_from(value)?,
                None => {
                    return Err(StoreError::Snapshot(format!(
                        "row in {} has no `{}` field",
                        table.name, primary_key
                    )))
                }
            };
            table.push(key, record)?;
        }
        Ok(table)
    }

    pub(crate) fn next_id(&self) -> i64 {
        self.next_id
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|e| &e.record)
    }

    pub(crate) fn insert(&mut self, primary_key: &str, mut record: Record) -> Result<Record, StoreError> {
        let key = match record.get(primary_key) {
            None | Some(Value::Null) => {
                let key = Key::Int(self.next_id);
                record.set(primary_key, key.clone());
                key
            }
            Some(value) => Key::try_from(value)?,
        };

        self.push(key, record.clone())?;
        Ok(record)
    }

    pub(crate) fn update(
        &mut self,
        primary_key: &str,
        record: Record,
        mode: UpdateMode,
    ) -> Result<Record, StoreError> {
        let key = match record.get(primary_key) {
            None | Some(Value::Null) => {
                return Err(StoreError::Validation(format!(
                    "update on {} requires a `{}` field",
                    self.name, primary_key
                )))
            }
            Some(value) => Key::try_from(value)?,
        };

        let position = *self.index.get(&key).ok_or_else(|| StoreError::NotFound {
            table: self.name.clone(),
            ids: vec![key],
        })?;

        let stored = &mut self.entries[position].record;
        match mode {
            UpdateMode::Merge => {
                for (field, value) in record {
                    stored.set(field, value);
                }
            }
            UpdateMode::Replace => *stored = record,
        }
        Ok(stored.clone())
    }

    /// Remove the given keys. With `all_or_nothing`, any missing key fails the
    /// call before anything is removed.
    pub(crate) fn delete(
        &mut self,
        ids: &[Key],
        all_or_nothing: bool,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut seen = HashSet::new();
        let mut outcome = DeleteOutcome::default();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            if self.index.contains_key(id) {
                outcome.deleted.push(id.clone());
            } else {
                outcome.missing.push(id.clone());
            }
        }

        if all_or_nothing && !outcome.missing.is_empty() {
            return Err(StoreError::NotFound {
                table: self.name.clone(),
                ids: outcome.missing,
            });
        }

        if !outcome.deleted.is_empty() {
            let doomed: HashSet<&Key> = outcome.deleted.iter().collect();
            self.entries.retain(|e| !doomed.contains(&e.key));
            self.reindex();
        }
        Ok(outcome)
    }

    fn push(&mut self, key: Key, record: Record) -> Result<(), StoreError> {
        if self.index.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                table: self.name.clone(),
                id: key,
            });
        }
        if let Key::Int(n) = key {
            if n >= self.next_id {
                self.next_id = n.saturating_add(1);
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, record });
        Ok(())
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.key.clone(), pos))
            .collect();
    }
}
