//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// What happens when an operation names a table that does not exist yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TablePolicy {
    /// Tables are created on first reference.
    #[default]
    Implicit,
    /// Tables must be created with `create_table`; unknown names fail with
    /// `StoreError::TableNotFound`.
    Explicit,
}

/// How `update_by_id` applies the supplied record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Supplied fields overwrite; fields not mentioned are kept.
    #[default]
    Merge,
    /// The stored record becomes exactly the supplied record.
    Replace,
}

/// How `delete_by_id` treats ids that do not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Any missing id fails the whole call and nothing is removed.
    #[default]
    AllOrNothing,
    /// Existing ids are removed; missing ones are reported in the outcome.
    Partial,
}

/// Configuration for an [`InMemoryTableStore`](crate::InMemoryTableStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the primary-key field in every table.
    pub primary_key: String,
    pub table_policy: TablePolicy,
    pub update_mode: UpdateMode,
    pub delete_policy: DeletePolicy,
    /// Where `flush`/`close` persist the store and `open` restores it from.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            table_policy: TablePolicy::default(),
            update_mode: UpdateMode::default(),
            delete_policy: DeletePolicy::default(),
            snapshot_path: None,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| StoreError::Validation(format!("invalid store config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = field.into();
        self
    }

    pub fn with_table_policy(mut self, policy: TablePolicy) -> Self {
        self.table_policy = policy;
        self
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.primary_key.is_empty() {
            return Err(StoreError::Validation(
                "primary key field name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
