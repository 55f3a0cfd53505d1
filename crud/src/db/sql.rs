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

//! Generation of SQL statements from schemas.
//!
//! Identifiers in the generated statements only ever come from schemas, which are static, and
//! conditions are only accepted on columns that the schema declares.  Values are always bound.

use crate::model::{
    Access, Audit, CREATED_AT_COLUMN, Condition, FieldKind, KEY_COLUMN, LAST_UPDATED_COLUMN, Op,
    Record, Schema, Value,
};
use tiercrud_core::model::{ModelError, ModelResult};
use time::OffsetDateTime;

/// SQL flavors that the generator knows how to emit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dialect {
    /// PostgreSQL, with numbered `$n` placeholders.
    Postgres,

    /// SQLite, with positional `?` placeholders.
    Sqlite,
}

/// A range of rows to return from a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// Maximum number of rows to return.
    pub limit: i64,

    /// Number of rows to skip.
    pub offset: i64,
}

/// A generated statement along with the values to bind to its placeholders, in order.
#[derive(Debug, PartialEq)]
pub(crate) struct Statement {
    /// Text of the statement.
    pub(crate) sql: String,

    /// Values to bind, with the kind of the column they are compared to or stored in so that
    /// nulls can be bound with the right type.
    pub(crate) binds: Vec<(FieldKind, Value)>,
}

/// Incremental builder for a `Statement`.
struct Builder {
    /// Flavor of the statement.
    dialect: Dialect,

    /// Text accumulated so far.
    sql: String,

    /// Values accumulated so far.
    binds: Vec<(FieldKind, Value)>,
}

impl Builder {
    /// Starts a new statement with the given `prefix`.
    fn new(dialect: Dialect, prefix: &str) -> Self {
        Self { dialect, sql: prefix.to_owned(), binds: vec![] }
    }

    /// Appends raw text.
    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Appends a placeholder for `value` and records the value.
    fn push_bind(&mut self, kind: FieldKind, value: Value) -> &mut Self {
        self.binds.push((kind, value));
        match self.dialect {
            Dialect::Postgres => {
                let placeholder = format!("${}", self.binds.len());
                self.sql.push_str(&placeholder);
            }
            Dialect::Sqlite => self.sql.push('?'),
        }
        self
    }

    /// Appends a `WHERE` clause with all `conditions`, if any.
    fn push_where(&mut self, schema: &Schema, conditions: &[Condition]) -> ModelResult<()> {
        for (i, condition) in conditions.iter().enumerate() {
            let column = condition.field();
            let kind = schema.column_kind(column).ok_or_else(|| {
                ModelError(format!("Unknown field {} in {}", column, schema.name()))
            })?;

            self.push(if i == 0 { " WHERE " } else { " AND " });
            match (condition.op(), condition.value()) {
                (Op::IsNull, _) | (Op::Eq, Value::Null) => {
                    self.push(column).push(" IS NULL");
                }
                (Op::IsNotNull, _) | (Op::Ne, Value::Null) => {
                    self.push(column).push(" IS NOT NULL");
                }
                (Op::Contains, value) => {
                    let function = match self.dialect {
                        Dialect::Postgres => "strpos(",
                        Dialect::Sqlite => "instr(",
                    };
                    self.push(function).push(column).push(", ");
                    self.push_bind(kind, value.clone()).push(") > 0");
                }
                (op, value) => {
                    let op = match op {
                        Op::Eq => " = ",
                        Op::Ne => " <> ",
                        Op::Lt => " < ",
                        Op::Le => " <= ",
                        Op::Gt => " > ",
                        Op::Ge => " >= ",
                        Op::Contains | Op::IsNull | Op::IsNotNull => unreachable!(),
                    };
                    self.push(column).push(op).push_bind(kind, value.clone());
                }
            }
        }
        Ok(())
    }

    /// Finishes the statement.
    fn build(self) -> Statement {
        Statement { sql: self.sql, binds: self.binds }
    }
}

/// Returns the comma-separated list of all stored columns of `schema`.
fn all_columns(schema: &Schema) -> String {
    let mut columns = vec![KEY_COLUMN, CREATED_AT_COLUMN, LAST_UPDATED_COLUMN];
    columns.extend(schema.persisted().map(|f| f.name()));
    columns.join(", ")
}

/// Generates a query for all rows that match `conditions`, sorted by key, optionally restricted
/// to a `window`.
pub(crate) fn select(
    dialect: Dialect,
    schema: &Schema,
    conditions: &[Condition],
    window: Option<Window>,
) -> ModelResult<Statement> {
    let mut builder = Builder::new(
        dialect,
        &format!("SELECT {} FROM {}", all_columns(schema), schema.name()),
    );
    builder.push_where(schema, conditions)?;
    builder.push(" ORDER BY ").push(KEY_COLUMN);
    if let Some(window) = window {
        builder.push(&format!(" LIMIT {} OFFSET {}", window.limit, window.offset));
    }
    Ok(builder.build())
}

/// Generates a query that returns one row if any row matches `conditions`, and none otherwise.
pub(crate) fn exists(
    dialect: Dialect,
    schema: &Schema,
    conditions: &[Condition],
) -> ModelResult<Statement> {
    let mut builder = Builder::new(dialect, &format!("SELECT 1 FROM {}", schema.name()));
    builder.push_where(schema, conditions)?;
    builder.push(" LIMIT 1");
    Ok(builder.build())
}

/// Generates a query that counts the rows matching `conditions` into a `count` column.
pub(crate) fn count(
    dialect: Dialect,
    schema: &Schema,
    conditions: &[Condition],
) -> ModelResult<Statement> {
    let mut builder =
        Builder::new(dialect, &format!("SELECT COUNT(*) AS count FROM {}", schema.name()));
    builder.push_where(schema, conditions)?;
    Ok(builder.build())
}

/// Generates an insertion of a new row that returns the key of the row.
///
/// `key` must be `None` when the schema's keys are generated by the database.
pub(crate) fn insert(
    dialect: Dialect,
    schema: &Schema,
    key: Option<Value>,
    audit: &Audit,
    record: &Record,
) -> Statement {
    let mut columns = vec![];
    let mut values = vec![];
    if let Some(key) = key {
        columns.push(KEY_COLUMN);
        values.push((schema.key_kind(), key));
    }
    columns.push(CREATED_AT_COLUMN);
    values.push((FieldKind::Timestamp, Value::Timestamp(audit.created_at)));
    columns.push(LAST_UPDATED_COLUMN);
    values.push((FieldKind::Timestamp, Value::Timestamp(audit.last_updated)));
    for field in schema.persisted() {
        columns.push(field.name());
        values.push((field.kind(), record.get(field.name()).clone()));
    }

    let mut builder = Builder::new(
        dialect,
        &format!("INSERT INTO {} ({}) VALUES (", schema.name(), columns.join(", ")),
    );
    for (i, (kind, value)) in values.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push_bind(kind, value);
    }
    builder.push(") RETURNING ").push(KEY_COLUMN);
    builder.build()
}

/// Generates an update of the mutable fields of the row identified by `key`.
///
/// The update only applies if the row's `last_updated` still matches `token`, which is the value
/// the caller read before computing the new contents.
pub(crate) fn update(
    dialect: Dialect,
    schema: &Schema,
    key: Value,
    last_updated: OffsetDateTime,
    token: OffsetDateTime,
    record: &Record,
) -> Statement {
    let mut builder = Builder::new(dialect, &format!("UPDATE {} SET ", schema.name()));
    builder.push(LAST_UPDATED_COLUMN).push(" = ");
    builder.push_bind(FieldKind::Timestamp, Value::Timestamp(last_updated));
    for field in schema.fields().iter().filter(|f| f.access() == Access::ReadWrite) {
        builder.push(", ").push(field.name()).push(" = ");
        builder.push_bind(field.kind(), record.get(field.name()).clone());
    }
    builder.push(" WHERE ").push(KEY_COLUMN).push(" = ").push_bind(schema.key_kind(), key);
    builder.push(" AND ").push(LAST_UPDATED_COLUMN).push(" = ");
    builder.push_bind(FieldKind::Timestamp, Value::Timestamp(token));
    builder.build()
}

/// Generates a deletion of the row identified by `key`.
pub(crate) fn delete(dialect: Dialect, schema: &Schema, key: Value) -> Statement {
    let mut builder = Builder::new(dialect, &format!("DELETE FROM {} WHERE ", schema.name()));
    builder.push(KEY_COLUMN).push(" = ").push_bind(schema.key_kind(), key);
    builder.build()
}
