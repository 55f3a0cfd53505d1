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

//! Plumbing shared by every layer of a CRUD service.
//!
//! Services built on top of this crate follow a layered architecture, and every layer has its own
//! module here with the types that all services need:
//!
//! 1.  `model`: Plain data types.  This crate only provides the errors that model types raise
//!     when they are constructed from invalid data, including the structured `ValidationErrors`
//!     produced by declarative field validation.
//!
//! 1.  `db`: The persistence layer.  A `Db` hands out `Executor`s, either bound to the pool or to
//!     an open transaction, and services issue queries against them.
//!
//! 1.  `driver`: The business logic layer.  Operations coordinate one unit of work against the
//!     database and report failures with a `DriverError`.
//!
//! 1.  `rest`: The HTTP layer.  `RestError` translates driver failures into status codes and the
//!     extractors in here normalize how request payloads are accepted.
//!
//! There are result and error types in every layer, such as `DbResult` and `DbError`.  Errors
//! float to the top of the app using the `?` operator and are translated to HTTP status codes
//! once returned from the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
