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

//! Declarative description of the fields of a shape.
//!
//! A `Schema` is built once per shape and cached in a `static LazyLock`.  It drives field
//! validation, SQL generation, row decoding and the property metadata exposed to clients.

use crate::model::{Condition, FieldKind, Key, Op, Record, Value};
use regex::Regex;
use std::collections::BTreeMap;
use tiercrud_core::model::{FieldError, ModelError, ModelResult};

/// Name of the column that holds the key of an entity.
pub const KEY_COLUMN: &str = "id";

/// Name of the column that holds the creation timestamp of an entity.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Name of the column that holds the last modification timestamp of an entity.
pub const LAST_UPDATED_COLUMN: &str = "last_updated";

/// How a field participates in writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// The field is written on creation and on updates.
    ReadWrite,

    /// The field is written on creation only.  Updates never overwrite it.
    Immutable,

    /// The field is computed for display purposes and never persisted nor validated.
    Derived,
}

/// A declarative constraint on the value of a field.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// The field must have a value.  For text, the value must also not be blank.
    Required,

    /// Text must have at least this many characters.
    MinLength(usize),

    /// Text must have at most this many characters.
    MaxLength(usize),

    /// The value must fall within these inclusive bounds.
    Range(Value, Value),

    /// Text must match this regular expression.
    Pattern(Regex),
}

/// Describes a single field of a shape.
#[derive(Clone, Debug)]
#[must_use]
pub struct Field {
    /// Name of the field, which matches its column name and its serialized name.
    name: &'static str,

    /// Storage type of the field.
    kind: FieldKind,

    /// Whether the field accepts nulls.
    nullable: bool,

    /// How the field participates in writes.
    access: Access,

    /// Constraints checked during validation.
    constraints: Vec<Constraint>,
}

impl Field {
    /// Creates a new non-nullable, read-write field of the given `kind`.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: false, access: Access::ReadWrite, constraints: vec![] }
    }

    /// Creates a new text field.
    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates a new integer field.
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Creates a new real field.
    pub fn real(name: &'static str) -> Self {
        Self::new(name, FieldKind::Real)
    }

    /// Creates a new boolean field.
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Creates a new timestamp field.
    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    /// Creates a new UUID field.
    pub fn uuid(name: &'static str) -> Self {
        Self::new(name, FieldKind::Uuid)
    }

    /// Marks the field as accepting nulls.
    pub fn optional(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Requires the field to have a non-blank value.
    pub fn required(mut self) -> Self {
        self.constraints.push(Constraint::Required);
        self
    }

    /// Requires text to have at least `min` characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.push(Constraint::MinLength(min));
        self
    }

    /// Requires text to have at most `max` characters.
    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.push(Constraint::MaxLength(max));
        self
    }

    /// Requires the value to be within `min` and `max`, both inclusive.
    pub fn range<V: Into<Value>>(mut self, min: V, max: V) -> Self {
        self.constraints.push(Constraint::Range(min.into(), max.into()));
        self
    }

    /// Requires text to match the regular expression `re`.
    ///
    /// Schemas are static definitions so an invalid `re` is a programming error and panics.
    pub fn pattern(mut self, re: &str) -> Self {
        let re = match Regex::new(re) {
            Ok(re) => re,
            Err(e) => panic!("Invalid pattern for field {}: {}", self.name, e),
        };
        self.constraints.push(Constraint::Pattern(re));
        self
    }

    /// Marks the field as never being overwritten by updates.
    pub fn immutable(mut self) -> Self {
        self.access = Access::Immutable;
        self
    }

    /// Marks the field as computed and never persisted.
    pub fn derived(mut self) -> Self {
        self.access = Access::Derived;
        self
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the storage type of the field.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns whether the field accepts nulls.
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Returns how the field participates in writes.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Returns true if the field is stored in the database.
    pub fn persisted(&self) -> bool {
        self.access != Access::Derived
    }

    /// Checks `value` against the constraints of this field and appends any violations to
    /// `errors`.
    fn check(&self, value: &Value, errors: &mut Vec<FieldError>) {
        let required = self.constraints.iter().any(|c| matches!(c, Constraint::Required));

        let text = match value {
            Value::Null => {
                if required || !self.nullable {
                    errors.push(FieldError::new(self.name, "is required"));
                }
                return;
            }
            value if value.kind() != Some(self.kind) => {
                errors.push(FieldError::new(
                    self.name,
                    format!("must be a {}", self.kind.type_name()),
                ));
                return;
            }
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        };

        for constraint in &self.constraints {
            let message = match (constraint, text) {
                (Constraint::Required, Some(text)) if text.trim().is_empty() => {
                    "is required".to_owned()
                }
                (Constraint::MinLength(min), Some(text)) if text.chars().count() < *min => {
                    format!("must be at least {} characters long", min)
                }
                (Constraint::MaxLength(max), Some(text)) if text.chars().count() > *max => {
                    format!("must be at most {} characters long", max)
                }
                (Constraint::Range(min, max), _)
                    if value.compare(min).is_some_and(|o| o.is_lt())
                        || value.compare(max).is_some_and(|o| o.is_gt()) =>
                {
                    format!("must be between {} and {}", min, max)
                }
                (Constraint::Pattern(re), Some(text)) if !re.is_match(text) => {
                    "does not match the expected format".to_owned()
                }
                _ => continue,
            };
            errors.push(FieldError::new(self.name, message));
        }
    }
}

/// Declarative description of a shape: where it lives, what its key looks like and which fields
/// it carries.
///
/// The key and the audit timestamps are implicit and never appear in `fields`.
#[derive(Debug)]
pub struct Schema {
    /// Name of the table backing the shape.  For DTOs this is only informational.
    name: &'static str,

    /// Storage type of the key.
    key_kind: FieldKind,

    /// Whether the database assigns keys on insertion.
    key_generated: bool,

    /// Business fields of the shape.
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema for a shape named `name` whose keys are of type `K`.
    pub fn new<K: Key>(name: &'static str) -> Self {
        Self { name, key_kind: K::KIND, key_generated: false, fields: vec![] }
    }

    /// Declares that keys are assigned by the database on insertion.
    #[must_use]
    pub fn generated_key(mut self) -> Self {
        self.key_generated = true;
        self
    }

    /// Appends a business `field` to the schema.
    ///
    /// Field names must be unique and cannot clash with the implicit columns.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        assert!(
            ![KEY_COLUMN, CREATED_AT_COLUMN, LAST_UPDATED_COLUMN].contains(&field.name),
            "Field name {} is reserved",
            field.name
        );
        assert!(self.get(field.name).is_none(), "Duplicate field {}", field.name);
        self.fields.push(field);
        self
    }

    /// Returns the name of the table backing the shape.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the storage type of the key.
    pub fn key_kind(&self) -> FieldKind {
        self.key_kind
    }

    /// Returns whether keys are assigned by the database.
    pub fn key_generated(&self) -> bool {
        self.key_generated
    }

    /// Returns all business fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the business field called `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the fields that are stored in the database.
    pub fn persisted(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.persisted())
    }

    /// Returns the kind of the stored column `name`, including the implicit columns.
    pub fn column_kind(&self, name: &str) -> Option<FieldKind> {
        match name {
            KEY_COLUMN => Some(self.key_kind),
            CREATED_AT_COLUMN | LAST_UPDATED_COLUMN => Some(FieldKind::Timestamp),
            name => self.get(name).filter(|f| f.persisted()).map(Field::kind),
        }
    }

    /// Validates the business fields in `record` and returns every violation found.
    pub fn check(&self, record: &Record) -> Vec<FieldError> {
        let mut errors = vec![];
        for field in self.persisted() {
            field.check(record.get(field.name), &mut errors);
        }
        errors
    }

    /// Validates that `condition` can be applied to the columns of this schema.
    pub fn check_condition(&self, condition: &Condition) -> ModelResult<()> {
        let Some(kind) = self.column_kind(condition.field()) else {
            return Err(ModelError(format!(
                "Unknown field {} in {}",
                condition.field(),
                self.name
            )));
        };

        match (condition.op(), condition.value()) {
            (Op::IsNull | Op::IsNotNull, _) => Ok(()),
            (Op::Eq | Op::Ne, Value::Null) => Ok(()),
            (Op::Contains, Value::Text(_)) if kind == FieldKind::Text => Ok(()),
            (Op::Contains, _) => Err(ModelError(format!(
                "Cannot apply contains to field {}; it only works on strings",
                condition.field()
            ))),
            (op, value) if value.kind() == Some(kind) => {
                if kind == FieldKind::Boolean && !matches!(op, Op::Eq | Op::Ne) {
                    return Err(ModelError(format!(
                        "Cannot order boolean field {}",
                        condition.field()
                    )));
                }
                Ok(())
            }
            (_, value) => Err(ModelError(format!(
                "Field {} expects a {} but got {:?}",
                condition.field(),
                kind.type_name(),
                value
            ))),
        }
    }

    /// Returns the names and types of the fields that clients must provide on creation.
    pub fn property_info_for_create(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::default();
        if !self.key_generated {
            info.insert(KEY_COLUMN.to_owned(), self.key_kind.type_name().to_owned());
        }
        for field in self.persisted() {
            info.insert(field.name.to_owned(), field.kind.type_name().to_owned());
        }
        info
    }

    /// Returns the names and types of the fields that clients can provide on updates.
    pub fn property_info_for_update(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::default();
        info.insert(KEY_COLUMN.to_owned(), self.key_kind.type_name().to_owned());
        for field in self.fields.iter().filter(|f| f.access == Access::ReadWrite) {
            info.insert(field.name.to_owned(), field.kind.type_name().to_owned());
        }
        info
    }
}
