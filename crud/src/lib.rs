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

//! Generic CRUD services and controllers.
//!
//! An entity type opts into this crate by implementing `model::Entity`, which requires it to
//! expose its key, its audit timestamps and a `model::Schema` describing its fields.  With that
//! in place, a `driver::Service` provides the business operations for the entity and the
//! routers in `rest` expose them over HTTP.
//!
//! Operations are grouped in three capability tiers, expressed as type-level markers on the
//! service:
//!
//! *   `Close`: read-only access (read all, read one, paginate and existence checks).
//! *   `Open`: everything in `Close` plus creation and deletion.
//! *   `Full`: everything in `Open` plus updates.
//!
//! Services can optionally expose a transfer shape different from the storage shape by supplying
//! a `driver::Projection`, which maps entities to DTOs and back at the service boundary.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod db;
pub mod driver;
pub mod model;
pub mod rest;
