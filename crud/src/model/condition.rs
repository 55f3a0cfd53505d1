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

//! Predicates to narrow down queries.

use crate::model::Value;
use std::fmt;

/// Comparison operators supported in conditions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    /// Equality.  Comparing against null matches nulls.
    Eq,

    /// Inequality.  Comparing against null matches non-nulls.
    Ne,

    /// Strictly less than.
    Lt,

    /// Less than or equal to.
    Le,

    /// Strictly greater than.
    Gt,

    /// Greater than or equal to.
    Ge,

    /// Substring match on text fields.
    Contains,

    /// The field is null.
    IsNull,

    /// The field is not null.
    IsNotNull,
}

/// A single predicate on a stored field.  Multiple conditions are combined with `AND`.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Name of the column to test.
    field: String,

    /// Operator to apply.
    op: Op,

    /// Operand of the comparison, which is null for the unary operators.
    value: Value,
}

/// Generates a constructor for a binary operator.
macro_rules! binary_op [
    ( $name:ident, $op:ident, $doc:expr ) => {
        #[doc = $doc]
        pub fn $name<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
            Self { field: field.into(), op: Op::$op, value: value.into() }
        }
    }
];

impl Condition {
    binary_op!(eq, Eq, "Matches rows where `field` equals `value`.");
    binary_op!(ne, Ne, "Matches rows where `field` differs from `value`.");
    binary_op!(lt, Lt, "Matches rows where `field` is less than `value`.");
    binary_op!(le, Le, "Matches rows where `field` is less than or equal to `value`.");
    binary_op!(gt, Gt, "Matches rows where `field` is greater than `value`.");
    binary_op!(ge, Ge, "Matches rows where `field` is greater than or equal to `value`.");

    /// Matches rows where the text in `field` contains `needle`.
    pub fn contains<F: Into<String>, S: Into<String>>(field: F, needle: S) -> Self {
        Self { field: field.into(), op: Op::Contains, value: Value::Text(needle.into()) }
    }

    /// Matches rows where `field` is null.
    pub fn is_null<F: Into<String>>(field: F) -> Self {
        Self { field: field.into(), op: Op::IsNull, value: Value::Null }
    }

    /// Matches rows where `field` is not null.
    pub fn is_not_null<F: Into<String>>(field: F) -> Self {
        Self { field: field.into(), op: Op::IsNotNull, value: Value::Null }
    }

    /// Returns the name of the field to test.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Returns the operand.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Contains => "contains",
            Op::IsNull => return write!(f, "{} is null", self.field),
            Op::IsNotNull => return write!(f, "{} is not null", self.field),
        };
        write!(f, "{} {} {}", self.field, op, self.value)
    }
}
