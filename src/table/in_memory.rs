//! InMemoryTableStore - HashMap-style table store with optional snapshot persistence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use super::notify::ChangeKind;
#[cfg(feature = "emitter")]
use super::notify::Notifier;
use super::snapshot::{StoreSnapshot, TableSnapshot};
use super::storage::Table;
use super::{DeleteOutcome, TableStore};
use crate::{
    DeletePolicy, Filter, Key, Projection, Record, StoreConfig, StoreError, TablePolicy,
};

type TableHandle = Arc<RwLock<Table>>;

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Storage("lock poisoned".into())
}

/// In-memory table store.
///
/// Each table sits behind its own `RwLock`, so writers on different tables
/// never wait on each other. Clone-friendly via Arc: clones share storage
/// and lifecycle, so closing one handle closes them all. Snapshot writes
/// from any handle are serialized.
#[derive(Clone)]
pub struct InMemoryTableStore {
    config: Arc<StoreConfig>,
    tables: Arc<RwLock<BTreeMap<String, TableHandle>>>,
    closed: Arc<AtomicBool>,
    persist: Arc<Mutex<()>>,
    #[cfg(feature = "emitter")]
    notifier: Arc<Notifier>,
}

impl std::fmt::Debug for InMemoryTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTableStore")
            .field("config", &self.config)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTableStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// Open a store with `config`.
    ///
    /// If `config.snapshot_path` points at an existing snapshot, its tables
    /// are restored; a missing file starts an empty store.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let store = Self::build(config);

        if let Some(path) = store.config.snapshot_path.as_deref() {
            if let Some(snapshot) = StoreSnapshot::load(path)? {
                let mut tables = store.tables.write().map_err(poisoned)?;
                for table in snapshot.tables {
                    let name = table.name.clone();
                    let next_id = table.next_id;
                    let restored = Table::restore(
                        name.clone(),
                        &store.config.primary_key,
                        next_id,
                        table.into_records(),
                    )?;
                    tables.insert(name, Arc::new(RwLock::new(restored)));
                }
            }
        }

        info!(
            primary_key = %store.config.primary_key,
            snapshot = ?store.config.snapshot_path,
            "table store opened"
        );
        Ok(store)
    }

    fn build(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
            tables: Arc::new(RwLock::new(BTreeMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
            persist: Arc::new(Mutex::new(())),
            #[cfg(feature = "emitter")]
            notifier: Arc::new(Notifier::new()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Persist every table to the configured snapshot path.
    ///
    /// Without a snapshot path this does nothing.
    pub fn flush(&self) -> Result<(), StoreError> {
        let _persist = self.persist.lock().map_err(poisoned)?;
        self.ensure_open()?;
        self.write_snapshot()
    }

    /// Flush (when a snapshot path is configured) and close the store.
    ///
    /// Every later call on any handle fails with `StoreError::Closed`.
    /// Closing an already closed store is a no-op. If the snapshot cannot be
    /// written the store stays open and the error is returned.
    pub fn close(&self) -> Result<(), StoreError> {
        let _persist = self.persist.lock().map_err(poisoned)?;
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        // Writers are turned away while the final snapshot is taken.
        if let Err(e) = self.write_snapshot() {
            self.closed.store(false, Ordering::Release);
            warn!(error = %e, "close failed, store left open");
            return Err(e);
        }
        info!("table store closed");
        Ok(())
    }

    /// Register a listener for one kind of change on `table`.
    ///
    /// The listener receives JSON text and runs on an emitter thread.
    /// Returns an id for `remove_listener`.
    #[cfg(feature = "emitter")]
    pub fn on<F>(&self, table: &str, kind: ChangeKind, listener: F) -> Result<String, StoreError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.notifier.on(table, kind, listener)
    }

    /// Remove a listener. Returns true if it was registered.
    #[cfg(feature = "emitter")]
    pub fn remove_listener(&self, listener_id: &str) -> Result<bool, StoreError> {
        self.notifier.remove_listener(listener_id)
    }

    /// Called with the table's write guard held, so events for one table are
    /// emitted in the order their writes were applied.
    fn notify(&self, table: &str, kind: ChangeKind, payload: impl FnOnce() -> String) {
        #[cfg(feature = "emitter")]
        self.notifier.emit(table, kind, payload());
        #[cfg(not(feature = "emitter"))]
        let _ = (table, kind, payload);
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn write_snapshot(&self) -> Result<(), StoreError> {
        let Some(path) = self.config.snapshot_path.as_deref() else {
            debug!("no snapshot path configured, skipping flush");
            return Ok(());
        };

        let mut tables = Vec::new();
        for (name, handle) in self.handles()? {
            let table = handle.read().map_err(poisoned)?;
            tables.push(TableSnapshot::new(name, table.next_id(), table.records()));
        }
        StoreSnapshot::new(tables).save(path)
    }

    fn handles(&self) -> Result<Vec<(String, TableHandle)>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .iter()
            .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
            .collect())
    }

    /// Look up a table, creating it when the policy allows.
    fn table(&self, name: &str, create: bool) -> Result<TableHandle, StoreError> {
        self.ensure_open()?;
        if name.is_empty() {
            return Err(StoreError::Validation("table name must not be empty".into()));
        }

        if let Some(handle) = self.tables.read().map_err(poisoned)?.get(name) {
            return Ok(Arc::clone(handle));
        }

        if !create && self.config.table_policy == TablePolicy::Explicit {
            return Err(StoreError::TableNotFound {
                table: name.to_string(),
            });
        }

        let mut tables = self.tables.write().map_err(poisoned)?;
        let handle = tables.entry(name.to_string()).or_insert_with(|| {
            debug!(table = name, "table created");
            Arc::new(RwLock::new(Table::new(name)))
        });
        Ok(Arc::clone(handle))
    }
}

impl TableStore for InMemoryTableStore {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn create_table(&self, table: &str) -> Result<(), StoreError> {
        self.table(table, true).map(|_| ())
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.keys().cloned().collect())
    }

    fn select(
        &self,
        table: &str,
        projection: &Projection,
        filter: &Filter,
    ) -> Result<Vec<Record>, StoreError> {
        let handle = self.table(table, false)?;
        let rows = handle.read().map_err(poisoned)?;

        let found: Vec<Record> = rows
            .records()
            .filter(|r| filter.matches(r))
            .map(|r| r.project(projection))
            .collect();

        debug!(table, matched = found.len(), "select");
        Ok(found)
    }

    fn select_one(
        &self,
        table: &str,
        projection: &Projection,
        filter: &Filter,
    ) -> Result<Option<Record>, StoreError> {
        let handle = self.table(table, false)?;
        let rows = handle.read().map_err(poisoned)?;

        let found = rows
            .records()
            .find(|r| filter.matches(r))
            .map(|r| r.project(projection));

        debug!(table, found = found.is_some(), "select_one");
        Ok(found)
    }

    fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        let handle = self.table(table, false)?;
        let mut rows = handle.write().map_err(poisoned)?;
        let stored = rows
            .insert(&self.config.primary_key, record)
            .inspect_err(|e| warn!(table, error = %e, "insert rejected"))?;

        debug!(table, id = ?stored.get(&self.config.primary_key), "record inserted");
        self.notify(table, ChangeKind::Inserted, || stored.to_json().to_string());
        Ok(stored)
    }

    fn update_by_id(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        let handle = self.table(table, false)?;
        let mut rows = handle.write().map_err(poisoned)?;
        let stored = rows
            .update(&self.config.primary_key, record, self.config.update_mode)
            .inspect_err(|e| warn!(table, error = %e, "update rejected"))?;

        debug!(
            table,
            id = ?stored.get(&self.config.primary_key),
            mode = ?self.config.update_mode,
            "record updated"
        );
        self.notify(table, ChangeKind::Updated, || stored.to_json().to_string());
        Ok(stored)
    }

    fn delete_by_id(&self, table: &str, ids: &[Key]) -> Result<DeleteOutcome, StoreError> {
        let handle = self.table(table, false)?;
        let all_or_nothing = self.config.delete_policy == DeletePolicy::AllOrNothing;
        let mut rows = handle.write().map_err(poisoned)?;
        let outcome = rows
            .delete(ids, all_or_nothing)
            .inspect_err(|e| warn!(table, error = %e, "delete rejected"))?;

        if !outcome.missing.is_empty() {
            warn!(table, missing = ?outcome.missing, "delete skipped missing ids");
        }
        debug!(table, deleted = outcome.deleted.len(), "records deleted");

        if !outcome.deleted.is_empty() {
            self.notify(table, ChangeKind::Deleted, || outcome.deleted_json().to_string());
        }
        Ok(outcome)
    }

    fn combine_all_tables(&self) -> Result<BTreeMap<String, Vec<Record>>, StoreError> {
        self.ensure_open()?;
        let mut combined = BTreeMap::new();
        for (name, handle) in self.handles()? {
            let rows = handle.read().map_err(poisoned)?;
            combined.insert(name, rows.records().cloned().collect());
        }
        Ok(combined)
    }
}
