// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic database operations for any entity.
//!
//! Every operation takes the executor to run on so that callers decide whether the operation
//! runs directly against the pool or as part of a larger transaction.  Statements are generated
//! from the entity's schema by the `sql` module.

use crate::model::{Audit, Condition, Entity, KEY_COLUMN, Key, Record, Schema, Shape, Value};
use tiercrud_core::db::{DbError, DbResult, Executor};
use time::OffsetDateTime;

#[cfg(feature = "postgres")]
mod postgres;
mod sql;
pub use sql::Window;
use sql::{Dialect, Statement};
#[cfg(any(feature = "sqlite", test))]
mod sqlite;

/// A row as decoded from the database, before conversion to a specific entity type.
pub(crate) struct RawRow {
    /// Value of the key column.
    key: Value,

    /// Audit timestamps.
    audit: Audit,

    /// Business fields.
    record: Record,
}

impl RawRow {
    /// Assembles a row from its decoded columns, validating that the audit timestamps are set.
    pub(crate) fn new(
        key: Value,
        created_at: Value,
        last_updated: Value,
        record: Record,
    ) -> DbResult<Self> {
        let timestamp = |value: Value, column: &str| match value {
            Value::Timestamp(ts) => Ok(ts),
            value => Err(DbError::DataIntegrityError(format!(
                "Column {} should hold a timestamp but has {:?}",
                column, value
            ))),
        };
        let audit = Audit {
            created_at: timestamp(created_at, "created_at")?,
            last_updated: timestamp(last_updated, "last_updated")?,
        };
        Ok(Self { key, audit, record })
    }

    /// Converts the row into an entity of type `E`.
    fn into_entity<E: Entity>(self) -> DbResult<E> {
        let key = E::Key::from_value(self.key)?;
        Ok(E::from_record(key, self.audit, self.record)?)
    }
}

/// Returns the SQL flavor that `ex` speaks.
fn dialect(ex: &Executor) -> Dialect {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(_) => Dialect::Postgres,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(_) => Dialect::Sqlite,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs `stmt` and decodes all returned rows as rows of `schema`.
async fn fetch_all(ex: &mut Executor, schema: &Schema, stmt: Statement) -> DbResult<Vec<RawRow>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::fetch_all(ex, schema, stmt).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::fetch_all(ex, schema, stmt).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs `stmt` and returns whether it yielded any row.
async fn fetch_any(ex: &mut Executor, stmt: Statement) -> DbResult<bool> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::fetch_any(ex, stmt).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::fetch_any(ex, stmt).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs `stmt` and returns the value of its `count` column.
async fn fetch_count(ex: &mut Executor, stmt: Statement) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::fetch_count(ex, stmt).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::fetch_count(ex, stmt).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs the insertion `stmt` and returns the key of the new row.
async fn fetch_key(ex: &mut Executor, schema: &Schema, stmt: Statement) -> DbResult<Value> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::fetch_key(ex, schema, stmt).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::fetch_key(ex, schema, stmt).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs `stmt` and returns the number of affected rows.
async fn execute(ex: &mut Executor, stmt: Statement) -> DbResult<u64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::execute(ex, stmt).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::execute(ex, stmt).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Returns all entities that match `conditions`, sorted by key, optionally restricted to a
/// `window` of the results.
pub async fn find_many<E: Entity>(
    ex: &mut Executor,
    conditions: &[Condition],
    window: Option<Window>,
) -> DbResult<Vec<E>> {
    let schema = E::schema();
    let stmt = sql::select(dialect(ex), schema, conditions, window)?;
    let rows = fetch_all(ex, schema, stmt).await?;
    rows.into_iter().map(RawRow::into_entity::<E>).collect()
}

/// Returns the entity with the lowest key among those that match `conditions`.
pub async fn find_one<E: Entity>(
    ex: &mut Executor,
    conditions: &[Condition],
) -> DbResult<Option<E>> {
    let window = Window { limit: 1, offset: 0 };
    let mut entities = find_many::<E>(ex, conditions, Some(window)).await?;
    Ok(entities.pop())
}

/// Returns the entity identified by `key`, if it exists.
pub async fn get<E: Entity>(ex: &mut Executor, key: &E::Key) -> DbResult<Option<E>> {
    find_one(ex, &[Condition::eq(KEY_COLUMN, key.to_value())]).await
}

/// Returns whether any entity matches `conditions`.
pub async fn exists<E: Entity>(ex: &mut Executor, conditions: &[Condition]) -> DbResult<bool> {
    let stmt = sql::exists(dialect(ex), E::schema(), conditions)?;
    fetch_any(ex, stmt).await
}

/// Counts the entities that match `conditions`.
pub async fn count<E: Entity>(ex: &mut Executor, conditions: &[Condition]) -> DbResult<i64> {
    let stmt = sql::count(dialect(ex), E::schema(), conditions)?;
    fetch_count(ex, stmt).await
}

/// Inserts a new `entity` and returns its key, which is the one assigned by the database if the
/// schema says so.
pub async fn insert<E: Entity>(ex: &mut Executor, entity: &E) -> DbResult<E::Key> {
    let schema = E::schema();
    let key = if schema.key_generated() { None } else { Some(entity.key().to_value()) };
    let stmt = sql::insert(dialect(ex), schema, key, entity.audit(), &entity.to_record());
    let key = fetch_key(ex, schema, stmt).await?;
    Ok(E::Key::from_value(key)?)
}

/// Overwrites the stored copy of `entity` as long as its `last_updated` timestamp in the
/// database still matches `token`.
///
/// Immutable fields and the creation timestamp are never written.  Returns `DbError::Conflict`
/// if the row changed since `token` was read or if it is gone.
pub async fn update<E: Entity>(
    ex: &mut Executor,
    entity: &E,
    token: OffsetDateTime,
) -> DbResult<()> {
    let stmt = sql::update(
        dialect(ex),
        E::schema(),
        entity.key().to_value(),
        entity.audit().last_updated,
        token,
        &entity.to_record(),
    );
    match execute(ex, stmt).await? {
        0 => Err(DbError::Conflict),
        1 => Ok(()),
        n => Err(DbError::BackendError(format!("Update affected {} rows", n))),
    }
}

/// Deletes the entity identified by `key`.
pub async fn delete<E: Entity>(ex: &mut Executor, key: &E::Key) -> DbResult<()> {
    let stmt = sql::delete(dialect(ex), E::schema(), key.to_value());
    match execute(ex, stmt).await? {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        n => Err(DbError::BackendError(format!("Deletion affected {} rows", n))),
    }
}
