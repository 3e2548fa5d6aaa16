//! Schema-less CRUD over named tables.
//!
//! - [`TableStore`]: select, insert, update-by-id, delete-by-id and
//!   whole-store dumps, addressed by table name.
//! - [`InMemoryTableStore`]: per-table locking, snapshot persistence and
//!   change notifications.
//! - [`Row`] / [`TablesExt`]: typed access through serde.
//! - [`resolvers`]: JSON-in, JSON-out entry points for the `Users` table.

extern crate self as tablestore;

mod config;
mod error;
mod record;
pub mod resolvers;
mod row;
mod table;
mod value;

pub use config::{DeletePolicy, StoreConfig, TablePolicy, UpdateMode};
pub use error::StoreError;
pub use record::{Filter, Projection, Record};
pub use row::{Row, TableRepository, TablesExt};
pub use table::{ChangeKind, DeleteOutcome, InMemoryTableStore, TableStore};
pub use value::{Key, Value};

// Re-export the Row derive macro
pub use tablestore_macros::Row;
