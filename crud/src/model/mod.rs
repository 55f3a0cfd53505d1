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

//! Data types to describe the shapes handled by the services.

mod condition;
pub use condition::{Condition, Op};
mod entity;
pub use entity::{Audit, Entity, Key, Shape};
mod schema;
pub use schema::{
    Access, CREATED_AT_COLUMN, Constraint, Field, KEY_COLUMN, LAST_UPDATED_COLUMN, Schema,
};
mod value;
pub use value::{FieldKind, Record, Value};

#[cfg(test)]
pub(crate) mod testutils;
