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

//! Sample entity shared by the tests of all layers.

use crate::model::{Audit, Entity, Field, Record, Schema, Shape};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tiercrud_core::model::{FieldError, ModelResult};

/// Schema to create the `widgets` table in SQLite.
pub(crate) const WIDGETS_SQLITE_SCHEMA: &str = "
    CREATE TABLE widgets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at INTEGER NOT NULL,
        last_updated INTEGER NOT NULL,
        name TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        code TEXT NOT NULL UNIQUE,
        note TEXT
    );
";

/// Schema to create the `widgets` table in PostgreSQL.
pub(crate) const WIDGETS_POSTGRES_SCHEMA: &str = "
    CREATE TABLE widgets (
        id BIGSERIAL PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL,
        last_updated TIMESTAMPTZ NOT NULL,
        name TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity >= 0),
        code TEXT NOT NULL UNIQUE,
        note TEXT
    );
";

/// A sample entity with a generated key and fields that exercise every access mode.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Widget {
    /// Key assigned by the database.
    #[serde(default)]
    pub(crate) id: i64,

    /// Display name.
    pub(crate) name: String,

    /// Units in stock.
    pub(crate) quantity: i64,

    /// Catalog code, fixed at creation time.
    pub(crate) code: String,

    /// Free-form comment.
    #[serde(default)]
    pub(crate) note: Option<String>,

    /// Audit timestamps.
    #[serde(flatten)]
    pub(crate) audit: Audit,
}

impl Widget {
    /// Creates a widget that is not yet stored.
    pub(crate) fn new(name: &str, quantity: i64, code: &str) -> Self {
        Self {
            id: 0,
            name: name.to_owned(),
            quantity,
            code: code.to_owned(),
            note: None,
            audit: Audit::default(),
        }
    }

    /// Attaches a `note` to the widget.
    pub(crate) fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_owned());
        self
    }
}

/// Cached schema of `Widget`.
static WIDGET_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new::<i64>("widgets")
        .generated_key()
        .field(Field::text("name").required().max_length(32))
        .field(Field::integer("quantity").range(0, 1000))
        .field(Field::text("code").required().pattern("^[A-Z]{3}-[0-9]{3}$").immutable())
        .field(Field::text("note").optional())
});

impl Shape for Widget {
    type Key = i64;

    fn schema() -> &'static Schema {
        &WIDGET_SCHEMA
    }

    fn key(&self) -> &i64 {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("quantity", self.quantity)
            .with("code", self.code.as_str())
            .with("note", self.note.clone())
    }

    fn validate_extra(&self) -> Vec<FieldError> {
        if self.note.as_deref() == Some(self.name.as_str()) {
            vec![FieldError::new("note", "must not repeat the name")]
        } else {
            vec![]
        }
    }
}

impl Entity for Widget {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn set_audit(&mut self, audit: Audit) {
        self.audit = audit;
    }

    fn from_record(id: i64, audit: Audit, mut record: Record) -> ModelResult<Self> {
        Ok(Self {
            id,
            name: record.take_text("name")?,
            quantity: record.take_integer("quantity")?,
            code: record.take_text("code")?,
            note: record.take_opt_text("note")?,
            audit,
        })
    }
}
