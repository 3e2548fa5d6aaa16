//! Rows - typed access to tables through serde.
//!
//! Any `Serialize + Deserialize` struct of scalar fields can be stored as a
//! row; it travels through the store as a [`Record`](crate::Record).
//!
//! ## Example
//!
//! ```ignore
//! use tablestore::{InMemoryTableStore, Row, TablesExt};
//!
//! #[derive(Serialize, Deserialize, Clone, Row)]
//! #[row(table = "Users")]
//! struct User {
//!     pub id: Option<i64>,
//!     pub name: String,
//! }
//!
//! let store = InMemoryTableStore::new();
//! let ada = store.rows::<User>().insert(&User { id: None, name: "Ada".into() })?;
//! let loaded = store.rows::<User>().get(ada.id.unwrap())?;
//! ```

mod repository;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be stored as table rows.
pub trait Row: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The table this row type lives in.
    const TABLE: &'static str;
}

pub use repository::{TableRepository, TablesExt};
