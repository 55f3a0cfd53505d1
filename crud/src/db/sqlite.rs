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

//! Execution of generated statements against SQLite.

use crate::db::RawRow;
use crate::db::sql::Statement;
use crate::model::{
    CREATED_AT_COLUMN, FieldKind, KEY_COLUMN, LAST_UPDATED_COLUMN, Record, Schema, Value,
};
use futures::TryStreamExt;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Database, Row};
use tiercrud_core::db::DbResult;
use tiercrud_core::db::sqlite::{
    SqliteExecutor, build_timestamp, map_sqlx_error, unpack_timestamp,
};
use uuid::Uuid;

/// Type of the queries we build.
type SqliteQuery<'q> = Query<'q, Sqlite, <Sqlite as Database>::Arguments<'q>>;

/// Binds `value` to the next placeholder in `query`.  Nulls are bound with the type of `kind`.
fn bind(query: SqliteQuery<'_>, kind: FieldKind, value: Value) -> DbResult<SqliteQuery<'_>> {
    let query = match value {
        Value::Null => match kind {
            FieldKind::Boolean => query.bind(None::<bool>),
            FieldKind::Integer | FieldKind::Timestamp => query.bind(None::<i64>),
            FieldKind::Real => query.bind(None::<f64>),
            FieldKind::Text => query.bind(None::<String>),
            FieldKind::Uuid => query.bind(None::<Uuid>),
        },
        Value::Boolean(b) => query.bind(b),
        Value::Integer(i) => query.bind(i),
        Value::Real(r) => query.bind(r),
        Value::Text(s) => query.bind(s),
        Value::Timestamp(ts) => query.bind(unpack_timestamp(ts)?),
        Value::Uuid(u) => query.bind(u),
    };
    Ok(query)
}

/// Prepares the query for `stmt` with all of its values bound.
fn prepare(stmt: &Statement) -> DbResult<SqliteQuery<'_>> {
    let mut query = sqlx::query(&stmt.sql);
    for (kind, value) in &stmt.binds {
        query = bind(query, *kind, value.clone())?;
    }
    Ok(query)
}

/// Extracts the column `name` of type `kind` from `row`.
fn get_value(row: &SqliteRow, name: &str, kind: FieldKind) -> DbResult<Value> {
    let value = match kind {
        FieldKind::Boolean => row.try_get::<Option<bool>, _>(name).map(Value::from),
        FieldKind::Integer => row.try_get::<Option<i64>, _>(name).map(Value::from),
        FieldKind::Real => row.try_get::<Option<f64>, _>(name).map(Value::from),
        FieldKind::Text => row.try_get::<Option<String>, _>(name).map(Value::from),
        FieldKind::Uuid => row.try_get::<Option<Uuid>, _>(name).map(Value::from),
        FieldKind::Timestamp => {
            return match row.try_get::<Option<i64>, _>(name).map_err(map_sqlx_error)? {
                Some(usecs) => Ok(Value::Timestamp(build_timestamp(usecs)?)),
                None => Ok(Value::Null),
            };
        }
    };
    value.map_err(map_sqlx_error)
}

/// Decodes a full row of `schema`.
fn decode_row(schema: &Schema, row: &SqliteRow) -> DbResult<RawRow> {
    let key = get_value(row, KEY_COLUMN, schema.key_kind())?;
    let created_at = get_value(row, CREATED_AT_COLUMN, FieldKind::Timestamp)?;
    let last_updated = get_value(row, LAST_UPDATED_COLUMN, FieldKind::Timestamp)?;

    let mut record = Record::new();
    for field in schema.persisted() {
        record.set(field.name(), get_value(row, field.name(), field.kind())?);
    }

    RawRow::new(key, created_at, last_updated, record)
}

/// Runs a query and decodes all returned rows as rows of `schema`.
pub(super) async fn fetch_all(
    ex: &mut SqliteExecutor,
    schema: &Schema,
    stmt: Statement,
) -> DbResult<Vec<RawRow>> {
    let mut rows = prepare(&stmt)?.fetch(ex.conn());
    let mut result = vec![];
    while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
        result.push(decode_row(schema, &row)?);
    }
    Ok(result)
}

/// Runs a query and returns whether it yielded any row.
pub(super) async fn fetch_any(ex: &mut SqliteExecutor, stmt: Statement) -> DbResult<bool> {
    let row = prepare(&stmt)?.fetch_optional(ex.conn()).await.map_err(map_sqlx_error)?;
    Ok(row.is_some())
}

/// Runs a query that returns a single `count` column.
pub(super) async fn fetch_count(ex: &mut SqliteExecutor, stmt: Statement) -> DbResult<i64> {
    let row = prepare(&stmt)?.fetch_one(ex.conn()).await.map_err(map_sqlx_error)?;
    row.try_get("count").map_err(map_sqlx_error)
}

/// Runs an insertion and returns the key it yielded.
pub(super) async fn fetch_key(
    ex: &mut SqliteExecutor,
    schema: &Schema,
    stmt: Statement,
) -> DbResult<Value> {
    let row = prepare(&stmt)?.fetch_one(ex.conn()).await.map_err(map_sqlx_error)?;
    get_value(&row, KEY_COLUMN, schema.key_kind())
}

/// Runs a statement and returns the number of affected rows.
pub(super) async fn execute(ex: &mut SqliteExecutor, stmt: Statement) -> DbResult<u64> {
    let done = prepare(&stmt)?.execute(ex.conn()).await.map_err(map_sqlx_error)?;
    Ok(done.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::generate_entity_tests;
    use crate::model::testutils::WIDGETS_SQLITE_SCHEMA;
    use std::sync::Arc;
    use tiercrud_core::db::Db;
    use tiercrud_core::db::sqlite::{run_schema, testutils::setup};

    /// Creates an in-memory database with the `widgets` table.
    async fn setup_widgets() -> Arc<dyn Db + Send + Sync> {
        let db = setup().await;
        {
            let mut ex = db.typed_ex().await.unwrap();
            run_schema(&mut ex, WIDGETS_SQLITE_SCHEMA).await.unwrap();
        }
        Arc::new(db)
    }

    generate_entity_tests!(setup_widgets().await);

    #[tokio::test]
    async fn test_get_value_kinds() {
        let db = setup().await;
        let mut ex = db.typed_ex().await.unwrap();
        let row = sqlx::query("SELECT NULL AS a, 1 AS b, 'x' AS c")
            .fetch_one(ex.conn())
            .await
            .unwrap();
        assert_eq!(Value::Null, get_value(&row, "a", FieldKind::Text).unwrap());
        assert_eq!(Value::Integer(1), get_value(&row, "b", FieldKind::Integer).unwrap());
        assert_eq!(Value::from("x"), get_value(&row, "c", FieldKind::Text).unwrap());
        drop(ex);
        db.close().await;
    }
}
