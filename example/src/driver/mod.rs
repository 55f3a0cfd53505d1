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


//! Business logic of the catalog.
//!
//! All operations come from the generic services.  This module only supplies the customizations
//! that make authors and books behave like a catalog.

use crate::model::{Author, Book};
use std::sync::Arc;
use tiercrud::driver::{CloseService, CrudOptions, FullService, Identity, OpenService, Service};
use tiercrud_core::clocks::Clock;
use tiercrud_core::db::Db;
use tiercrud_core::driver::DriverResult;

mod authors;
pub(crate) use authors::AuthorHooks;
mod books;
pub(crate) use books::{BookHooks, BookMapper};
#[cfg(test)]
pub(crate) mod testutils;

/// Service to manage authors.  Authors cannot be edited once created.
pub(crate) type AuthorService = OpenService<Author, Identity, AuthorHooks>;

/// Service to manage books, which are exposed with the name of their author.
pub(crate) type BookService = FullService<Book, BookMapper, BookHooks>;

/// Read-only service to browse all books as they are stored, archived ones included.
pub(crate) type CatalogService = CloseService<Book>;

/// Collection of all the services of the catalog.
#[derive(Clone)]
pub(crate) struct Services {
    /// Service to manage authors.
    pub(crate) authors: AuthorService,

    /// Service to manage books.
    pub(crate) books: BookService,

    /// Service to browse all books.
    pub(crate) catalog: CatalogService,
}

impl Services {
    /// Creates all services on top of `db` and `clock`.
    ///
    /// Fails if `opts` disable mappers because books cannot be exposed without one.
    pub(crate) fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: CrudOptions,
    ) -> DriverResult<Self> {
        Ok(Self {
            authors: Service::new(db.clone(), clock.clone(), Identity, AuthorHooks, opts.clone())?,
            books: Service::new(db.clone(), clock.clone(), BookMapper, BookHooks, opts.clone())?,
            catalog: Service::with_defaults(db, clock, opts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiercrud_core::clocks::SystemClock;
    use tiercrud_core::db::sqlite::testutils::setup;
    use tiercrud_core::driver::DriverError;

    #[tokio::test]
    async fn test_services_require_mappers() {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(setup().await);
        let clock = Arc::new(SystemClock::default());

        Services::new(db.clone(), clock.clone(), CrudOptions::default()).unwrap();

        let opts = CrudOptions { mapper_enabled: false, logging_enabled: false };
        match Services::new(db, clock, opts) {
            Err(DriverError::InvalidInput(e)) => assert!(e.contains("books")),
            Err(e) => panic!("Unexpected error: {}", e),
            Ok(_) => panic!("Services creation should have failed"),
        }
    }
}
