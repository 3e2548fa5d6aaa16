//! Change notifications for table mutations.

use std::fmt;
#[cfg(feature = "emitter")]
use std::sync::Mutex;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

#[cfg(feature = "emitter")]
use crate::StoreError;

/// The kind of mutation a listener is told about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Inserted => "inserted",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }

    /// Event name for a table, e.g. `Users:inserted`.
    pub fn event_name(&self, table: &str) -> String {
        format!("{}:{}", table, self.as_str())
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps an `EventEmitter` so it can be shared by store handles.
///
/// Payloads are JSON text: the stored record for inserts and updates, the
/// list of removed keys for deletes. The emitter runs listeners on its own
/// threads, so delivery is asynchronous.
#[cfg(feature = "emitter")]
pub(crate) struct Notifier {
    emitter: Mutex<EventEmitter>,
}

#[cfg(feature = "emitter")]
impl Notifier {
    pub(crate) fn new() -> Self {
        Notifier {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    pub(crate) fn on<F>(&self, table: &str, kind: ChangeKind, listener: F) -> Result<String, StoreError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| StoreError::Storage("emitter lock poisoned".into()))?;
        Ok(emitter.on(&kind.event_name(table), listener))
    }

    pub(crate) fn remove_listener(&self, listener_id: &str) -> Result<bool, StoreError> {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| StoreError::Storage("emitter lock poisoned".into()))?;
        Ok(emitter.remove_listener(listener_id).is_some())
    }

    pub(crate) fn emit(&self, table: &str, kind: ChangeKind, payload: String) {
        // Best-effort; the write has already been applied.
        if let Ok(mut emitter) = self.emitter.lock() {
            emitter.emit(&kind.event_name(table), payload);
        }
    }
}
