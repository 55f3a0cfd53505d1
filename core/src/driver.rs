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

//! Generic business logic for any service.
//!
//! Every operation implemented by a driver should consume `self` because this is the layer that
//! coordinates multiple operations against the database inside a single transaction.  Consuming
//! `self` prevents the caller from easily issuing multiple operations against the driver, as this
//! would require a clone and highlight an undesirable pattern.
//!
//! Failures are classified with `DriverError`.  The variants are precise enough for the REST layer
//! to pick a status code without inspecting error messages.

use crate::db::DbError;
use crate::model::{ModelError, ValidationErrors};

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a write lost a race against a concurrent modification.
    #[error("{0}")]
    Conflict(String),

    /// Indicates that the database refused a write because of a schema constraint.
    #[error("{0}")]
    Constraint(String),

    /// Indicates an error in the input data.
    #[error("{0}")]
    InvalidInput(String),

    /// Indicates that a business rule rejected the requested operation.
    #[error("{0}")]
    InvalidOperation(String),

    /// Indicates that the key of an update payload does not match the key of the target.
    #[error("Key mismatch: requested {key} but the payload carries {payload}")]
    KeyMismatch {
        /// Key that the caller asked to operate on.
        key: String,

        /// Key found in the payload.
        payload: String,
    },

    /// Indicates that a required argument was not provided.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that the input data violates declarative field constraints.
    #[error("{0}")]
    Validation(ValidationErrors),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AlreadyExists => DriverError::AlreadyExists(e.to_string()),
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::Conflict => DriverError::Conflict(e.to_string()),
            DbError::ConstraintViolation(_) => DriverError::Constraint(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::BackendError(e.to_string()),
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.to_string())
    }
}

impl From<ValidationErrors> for DriverError {
    fn from(e: ValidationErrors) -> Self {
        DriverError::Validation(e)
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
