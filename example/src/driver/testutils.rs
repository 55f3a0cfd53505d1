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


//! Test utilities for the catalog services.

use crate::db::init_schema;
use crate::driver::{AuthorService, BookService, CatalogService, Services};
use crate::model::{Author, Book};
use std::sync::Arc;
use tiercrud::db;
use tiercrud::driver::CrudOptions;
use tiercrud::model::Audit;
use tiercrud_core::clocks::Clock;
use tiercrud_core::clocks::testutils::SettableClock;
use tiercrud_core::db::Db;
use tiercrud_core::db::sqlite::testutils::setup;
use time::macros::datetime;

/// Container for the state required to run a catalog test.
pub(crate) struct TestContext {
    /// The database backing the services.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the services.
    clock: Arc<SettableClock>,

    /// The services under test.
    services: Services,
}

impl TestContext {
    /// Creates a new in-memory catalog with a fixed clock.
    pub(crate) async fn setup() -> Self {
        let db = setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let db: Arc<dyn Db + Send + Sync> = Arc::new(db);
        let clock = Arc::new(SettableClock::new(datetime!(2023-07-01 09:00:00 UTC)));
        let services = Services::new(db.clone(), clock.clone(), CrudOptions::default()).unwrap();
        Self { db, clock, services }
    }

    /// Returns all services.
    pub(crate) fn services(&self) -> Services {
        self.services.clone()
    }

    /// Returns the author service.
    pub(crate) fn authors(&self) -> AuthorService {
        self.services.authors.clone()
    }

    /// Returns the book service.
    pub(crate) fn books(&self) -> BookService {
        self.services.books.clone()
    }

    /// Returns the read-only book service.
    pub(crate) fn catalog(&self) -> CatalogService {
        self.services.catalog.clone()
    }

    /// Stores a new author named `name` directly in the database.
    pub(crate) async fn put_author(&self, name: &str) -> Author {
        let audit = Audit::new(self.clock.now_utc());
        let author = Author::new(0, name.to_owned(), None, audit);
        let mut tx = self.db.begin().await.unwrap();
        let id = db::insert(tx.ex(), &author).await.unwrap();
        let author = db::get::<Author>(tx.ex(), &id).await.unwrap().unwrap();
        tx.commit().await.unwrap();
        author
    }

    /// Stores a new book directly in the database.
    async fn insert_book(&self, title: &str, author_id: i64, isbn: &str, archived: bool) -> Book {
        let audit = Audit::new(self.clock.now_utc());
        let book =
            Book::new(0, title.to_owned(), author_id, 100, isbn.to_owned(), archived, audit);
        let mut tx = self.db.begin().await.unwrap();
        let id = db::insert(tx.ex(), &book).await.unwrap();
        let book = db::get::<Book>(tx.ex(), &id).await.unwrap().unwrap();
        tx.commit().await.unwrap();
        book
    }

    /// Stores a new book titled `title` by `author_id` directly in the database.
    pub(crate) async fn put_book(&self, title: &str, author_id: i64, isbn: &str) -> Book {
        self.insert_book(title, author_id, isbn, false).await
    }

    /// Stores a new archived book titled `title` by `author_id` directly in the database.
    pub(crate) async fn put_archived_book(&self, title: &str, author_id: i64, isbn: &str) -> Book {
        self.insert_book(title, author_id, isbn, true).await
    }
}
