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

//! Dynamically-typed field values and records.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tiercrud_core::model::{ModelError, ModelResult};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// The storage type of a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// A boolean.
    Boolean,

    /// A 64-bit signed integer.
    Integer,

    /// A double-precision floating point number.
    Real,

    /// A string.
    Text,

    /// A UTC timestamp with microsecond precision.
    Timestamp,

    /// A UUID.
    Uuid,
}

impl FieldKind {
    /// Returns the name of this kind as exposed to clients in property metadata.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Text => "string",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Uuid => "uuid",
        }
    }

    /// Parses the textual representation of a value of this kind, such as one received in a
    /// query string.
    pub fn parse(self, raw: &str) -> ModelResult<Value> {
        let invalid = |e: &dyn fmt::Display| {
            ModelError(format!("Invalid {} '{}': {}", self.type_name(), raw, e))
        };
        match self {
            FieldKind::Boolean => raw.parse::<bool>().map(Value::Boolean).map_err(|e| invalid(&e)),
            FieldKind::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|e| invalid(&e)),
            FieldKind::Real => raw.parse::<f64>().map(Value::Real).map_err(|e| invalid(&e)),
            FieldKind::Text => Ok(Value::Text(raw.to_owned())),
            FieldKind::Timestamp => {
                OffsetDateTime::parse(raw, &Rfc3339).map(Value::Timestamp).map_err(|e| invalid(&e))
            }
            FieldKind::Uuid => Uuid::parse_str(raw).map(Value::Uuid).map_err(|e| invalid(&e)),
        }
    }
}

/// A single field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,

    /// A boolean value.
    Boolean(bool),

    /// An integer value.
    Integer(i64),

    /// A real value.
    Real(f64),

    /// A string value.
    Text(String),

    /// A timestamp value.
    Timestamp(OffsetDateTime),

    /// A UUID value.
    Uuid(Uuid),
}

impl Value {
    /// Returns the kind of this value, or `None` for nulls as they fit any kind.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(FieldKind::Boolean),
            Value::Integer(_) => Some(FieldKind::Integer),
            Value::Real(_) => Some(FieldKind::Real),
            Value::Text(_) => Some(FieldKind::Text),
            Value::Timestamp(_) => Some(FieldKind::Timestamp),
            Value::Uuid(_) => Some(FieldKind::Uuid),
        }
    }

    /// Returns true if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compares two values of the same kind.  Values of different kinds and nulls are not
    /// comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (_, _) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => match ts.format(&Rfc3339) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{}", ts),
            },
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

/// Value returned when looking up fields that are not in a record.
static NULL: Value = Value::Null;

/// Generates the pair of `take` accessors for one `Value` variant.
macro_rules! take_accessors [
    ( $take:ident, $take_opt:ident, $variant:ident, $t:ty ) => {
        #[doc = concat!("Removes the `", stringify!($variant), "` value of the `name` field, ")]
        #[doc = "failing if it is missing, null or of a different kind."]
        pub fn $take(&mut self, name: &str) -> ModelResult<$t> {
            match self.$take_opt(name)? {
                Some(value) => Ok(value),
                None => Err(ModelError(format!("Field {} cannot be null", name))),
            }
        }

        #[doc = concat!("Removes the `", stringify!($variant), "` value of the `name` field, ")]
        #[doc = "returning `None` if it is missing or null."]
        pub fn $take_opt(&mut self, name: &str) -> ModelResult<Option<$t>> {
            match self.take(name) {
                Value::Null => Ok(None),
                Value::$variant(value) => Ok(Some(value)),
                value => Err(ModelError(format!(
                    "Field {} should hold a {} value but has {:?}",
                    name,
                    stringify!($variant),
                    value
                ))),
            }
        }
    }
];

/// A collection of named field values, which is how shapes are handed to and from the
/// persistence layer.
///
/// Records never contain the key or the audit timestamps of an entity: those travel separately.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record(BTreeMap<&'static str, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the field `name` with `value` to the record, replacing any previous value.
    pub fn with<V: Into<Value>>(mut self, name: &'static str, value: V) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the field `name` to `value`, replacing any previous value.
    pub fn set<V: Into<Value>>(&mut self, name: &'static str, value: V) {
        self.0.insert(name, value.into());
    }

    /// Returns the value of the field `name`, which is null if the field is not present.
    pub fn get(&self, name: &str) -> &Value {
        self.0.get(name).unwrap_or(&NULL)
    }

    /// Removes the field `name` from the record and returns its value, which is null if the
    /// field was not present.
    pub fn take(&mut self, name: &str) -> Value {
        self.0.remove(name).unwrap_or(Value::Null)
    }

    /// Returns an iterator over the fields in the record, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    take_accessors!(take_boolean, take_opt_boolean, Boolean, bool);
    take_accessors!(take_integer, take_opt_integer, Integer, i64);
    take_accessors!(take_real, take_opt_real, Real, f64);
    take_accessors!(take_text, take_opt_text, Text, String);
    take_accessors!(take_timestamp, take_opt_timestamp, Timestamp, OffsetDateTime);
    take_accessors!(take_uuid, take_opt_uuid, Uuid, Uuid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_fieldkind_parse_ok() {
        assert_eq!(Value::Boolean(true), FieldKind::Boolean.parse("true").unwrap());
        assert_eq!(Value::Integer(-12), FieldKind::Integer.parse("-12").unwrap());
        assert_eq!(Value::Real(1.5), FieldKind::Real.parse("1.5").unwrap());
        assert_eq!(Value::Text("a b".to_owned()), FieldKind::Text.parse("a b").unwrap());
        assert_eq!(
            Value::Timestamp(datetime!(2023-06-01 10:00:00 UTC)),
            FieldKind::Timestamp.parse("2023-06-01T10:00:00Z").unwrap()
        );
        let nil = Uuid::nil().to_string();
        assert_eq!(Value::Uuid(Uuid::nil()), FieldKind::Uuid.parse(&nil).unwrap());
    }

    #[test]
    fn test_fieldkind_parse_errors() {
        let err = FieldKind::Integer.parse("twelve").unwrap_err();
        assert!(err.0.starts_with("Invalid integer 'twelve':"), "{}", err);

        let err = FieldKind::Boolean.parse("1").unwrap_err();
        assert!(err.0.starts_with("Invalid boolean '1':"), "{}", err);

        FieldKind::Timestamp.parse("yesterday").unwrap_err();
        FieldKind::Uuid.parse("not-a-uuid").unwrap_err();
    }

    #[test]
    fn test_value_compare() {
        assert_eq!(Some(Ordering::Less), Value::Integer(1).compare(&Value::Integer(2)));
        assert_eq!(Some(Ordering::Equal), Value::from("a").compare(&Value::from("a")));
        assert_eq!(None, Value::Integer(1).compare(&Value::Real(1.0)));
        assert_eq!(None, Value::Null.compare(&Value::Null));
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::Null, Value::from(None::<String>));
        assert_eq!(Value::Integer(3), Value::from(Some(3)));
    }

    #[test]
    fn test_record_take_accessors() {
        let mut record = Record::new()
            .with("name", "foo")
            .with("count", 3)
            .with("note", None::<String>)
            .with("flag", true);

        assert_eq!("foo", record.take_text("name").unwrap());
        assert_eq!(3, record.take_integer("count").unwrap());
        assert_eq!(None, record.take_opt_text("note").unwrap());
        assert_eq!(None, record.take_opt_text("missing").unwrap());

        let err = record.take_text("flag").unwrap_err();
        assert_eq!("Field flag should hold a Text value but has Boolean(true)", err.0);

        let err = record.take_integer("note").unwrap_err();
        assert_eq!("Field note cannot be null", err.0);
    }

    #[test]
    fn test_record_get_missing_is_null() {
        let record = Record::new().with("a", 1);
        assert_eq!(&Value::Integer(1), record.get("a"));
        assert_eq!(&Value::Null, record.get("b"));
    }
}
