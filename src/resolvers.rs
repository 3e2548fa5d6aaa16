//! Resolvers for the `Users` table.
//!
//! Each resolver maps one external request shape onto a single
//! [`TableStore`] call, taking and returning JSON. Routing and transport
//! belong to the caller.

use serde_json::Value as Json;

use crate::{DeleteOutcome, Filter, Key, Projection, Record, StoreError, TableStore};

pub const USERS: &str = "Users";

/// Every table's contents as one JSON object keyed by table name.
pub fn megastate<S: TableStore>(store: &S) -> Result<Json, StoreError> {
    let combined = store.combine_all_tables()?;
    Ok(Json::Object(
        combined
            .into_iter()
            .map(|(table, rows)| (table, Json::Array(rows.iter().map(Record::to_json).collect())))
            .collect(),
    ))
}

/// List all users.
pub fn users<S: TableStore>(store: &S) -> Result<Vec<Json>, StoreError> {
    Ok(store
        .select_all(USERS, &Projection::All)?
        .iter()
        .map(Record::to_json)
        .collect())
}

/// Get one user by id. Returns None if there is no such user.
pub fn user<S: TableStore>(store: &S, id: &Json) -> Result<Option<Json>, StoreError> {
    let key = Key::from_json(id)?;
    let filter = Filter::by(store.config().primary_key.clone(), key);
    Ok(store
        .select_one(USERS, &Projection::All, &filter)?
        .map(|record| record.to_json()))
}

/// Create a user from a JSON body. The id is assigned when absent.
pub fn insert_user<S: TableStore>(store: &S, body: &Json) -> Result<Json, StoreError> {
    let record = Record::from_json(body)?;
    Ok(store.insert(USERS, record)?.to_json())
}

/// Update a user; the body must carry the id.
pub fn update_user<S: TableStore>(store: &S, body: &Json) -> Result<Json, StoreError> {
    let record = Record::from_json(body)?;
    Ok(store.update_by_id(USERS, record)?.to_json())
}

/// Delete users by id.
pub fn delete_user<S: TableStore>(store: &S, ids: &[Json]) -> Result<DeleteOutcome, StoreError> {
    let keys = ids.iter().map(Key::from_json).collect::<Result<Vec<_>, _>>()?;
    store.delete_by_id(USERS, &keys)
}
