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

//! The contract that types must satisfy to be managed by the services.

use crate::model::{FieldKind, KEY_COLUMN, Record, Schema, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use tiercrud_core::model::{FieldError, ModelError, ModelResult, ValidationErrors};
use time::OffsetDateTime;
use uuid::Uuid;

/// Types that can act as the key of an entity.
pub trait Key:
    Clone + Debug + Display + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Storage type of the key.
    const KIND: FieldKind;

    /// Converts the key to a value for binding in queries.
    fn to_value(&self) -> Value;

    /// Converts a value read from the database back to a key.
    fn from_value(value: Value) -> ModelResult<Self>;

    /// Returns true if the key carries no information and thus cannot identify an entity.
    fn is_blank(&self) -> bool {
        false
    }
}

impl Key for i32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Integer(i) => {
                i32::try_from(i).map_err(|_| ModelError(format!("Key {} does not fit in i32", i)))
            }
            value => Err(ModelError(format!("Invalid integer key {:?}", value))),
        }
    }
}

impl Key for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            value => Err(ModelError(format!("Invalid integer key {:?}", value))),
        }
    }
}

impl Key for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            value => Err(ModelError(format!("Invalid string key {:?}", value))),
        }
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Key for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            value => Err(ModelError(format!("Invalid uuid key {:?}", value))),
        }
    }

    fn is_blank(&self) -> bool {
        self.is_nil()
    }
}

/// Creation and modification timestamps carried by every entity.
///
/// Clients never need to provide these: missing timestamps deserialize to the Unix epoch and are
/// overwritten by the service on writes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Audit {
    /// When the entity was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the entity was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl Audit {
    /// Creates a new audit record where both timestamps are `now`.
    pub fn new(now: OffsetDateTime) -> Self {
        Self { created_at: now, last_updated: now }
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH)
    }
}

/// A type with a key and a declarative schema that can be validated and exchanged with clients.
///
/// Both entities and DTOs are shapes.
pub trait Shape: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Type of the key that identifies instances of this shape.
    type Key: Key;

    /// Returns the cached schema of this shape.
    fn schema() -> &'static Schema;

    /// Returns the key of this instance.
    fn key(&self) -> &Self::Key;

    /// Returns the business fields of this instance, excluding the key and the audit timestamps.
    fn to_record(&self) -> Record;

    /// Performs validations that cannot be expressed declaratively in the schema, such as
    /// cross-field checks.
    fn validate_extra(&self) -> Vec<FieldError> {
        vec![]
    }

    /// Validates this instance against its schema and `validate_extra`, returning every
    /// violation found.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let schema = Self::schema();

        let mut errors = vec![];
        if !schema.key_generated() && self.key().is_blank() {
            errors.push(FieldError::new(KEY_COLUMN, "is required"));
        }
        errors.extend(schema.check(&self.to_record()));
        errors.extend(self.validate_extra());
        ValidationErrors::check(errors)
    }
}

/// A shape that is persisted in its own table.
pub trait Entity: Shape {
    /// Returns the audit timestamps.
    fn audit(&self) -> &Audit;

    /// Replaces the audit timestamps.
    fn set_audit(&mut self, audit: Audit);

    /// Reconstructs an entity from the pieces read from the database.
    fn from_record(key: Self::Key, audit: Audit, record: Record) -> ModelResult<Self>;
}
