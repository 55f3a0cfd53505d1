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


//! High-level data types of the catalog.

use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tiercrud::model::{Audit, Entity, Field, Record, Schema, Shape};
use tiercrud_core::model::{FieldError, ModelResult};

/// A person who writes books.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Author {
    /// Key assigned by the database.
    #[serde(default)]
    id: i64,

    /// Full name of the author.
    name: String,

    /// ISO 3166 alpha-2 code of the country of the author, if known.
    #[serde(default)]
    country: Option<String>,

    /// Audit timestamps.
    #[serde(flatten)]
    #[getter(skip)]
    audit: Audit,
}

/// Cached schema of `Author`.
static AUTHOR_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new::<i64>("authors")
        .generated_key()
        .field(Field::text("name").required().max_length(64))
        .field(Field::text("country").optional().pattern("^[A-Z]{2}$"))
});

impl Shape for Author {
    type Key = i64;

    fn schema() -> &'static Schema {
        &AUTHOR_SCHEMA
    }

    fn key(&self) -> &i64 {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new().with("name", self.name.as_str()).with("country", self.country.clone())
    }
}

impl Entity for Author {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn set_audit(&mut self, audit: Audit) {
        self.audit = audit;
    }

    fn from_record(key: i64, audit: Audit, mut record: Record) -> ModelResult<Self> {
        Ok(Self::new(key, record.take_text("name")?, record.take_opt_text("country")?, audit))
    }
}

/// A book in the catalog as it is stored.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Book {
    /// Key assigned by the database.
    #[serde(default)]
    id: i64,

    /// Title of the book.
    title: String,

    /// Key of the author of the book.
    author_id: i64,

    /// Number of pages.
    pages: i64,

    /// ISBN-13 of the book, which cannot change once assigned.
    isbn: String,

    /// Whether the book is withdrawn from the catalog.
    #[serde(default)]
    archived: bool,

    /// Audit timestamps.
    #[serde(flatten)]
    #[getter(skip)]
    audit: Audit,
}

/// Builds the fields shared by `Book` and `BookDto`.
fn book_schema(name: &'static str) -> Schema {
    Schema::new::<i64>(name)
        .generated_key()
        .field(Field::text("title").required().max_length(128))
        .field(Field::integer("author_id").range(1, i64::MAX))
        .field(Field::integer("pages").range(1, 10000))
        .field(Field::text("isbn").required().pattern("^97[89][0-9]{10}$").immutable())
        .field(Field::boolean("archived"))
}

/// Cached schema of `Book`.
static BOOK_SCHEMA: LazyLock<Schema> = LazyLock::new(|| book_schema("books"));

/// Checks that the title of a book does not consist of its ISBN.
fn check_title(title: &str, isbn: &str) -> Vec<FieldError> {
    if title == isbn {
        vec![FieldError::new("title", "must not be the ISBN")]
    } else {
        vec![]
    }
}

impl Shape for Book {
    type Key = i64;

    fn schema() -> &'static Schema {
        &BOOK_SCHEMA
    }

    fn key(&self) -> &i64 {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("title", self.title.as_str())
            .with("author_id", self.author_id)
            .with("pages", self.pages)
            .with("isbn", self.isbn.as_str())
            .with("archived", self.archived)
    }

    fn validate_extra(&self) -> Vec<FieldError> {
        check_title(&self.title, &self.isbn)
    }
}

impl Entity for Book {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn set_audit(&mut self, audit: Audit) {
        self.audit = audit;
    }

    fn from_record(key: i64, audit: Audit, mut record: Record) -> ModelResult<Self> {
        Ok(Self::new(
            key,
            record.take_text("title")?,
            record.take_integer("author_id")?,
            record.take_integer("pages")?,
            record.take_text("isbn")?,
            record.take_boolean("archived")?,
            audit,
        ))
    }
}

/// A book as exposed to clients, which carries the name of its author for display purposes.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct BookDto {
    /// Key assigned by the database.
    #[serde(default)]
    id: i64,

    /// Title of the book.
    title: String,

    /// Key of the author of the book.
    author_id: i64,

    /// Name of the author of the book.  Ignored on input.
    #[serde(default)]
    author_name: String,

    /// Number of pages.
    pages: i64,

    /// ISBN-13 of the book.
    isbn: String,

    /// Whether the book is withdrawn from the catalog.
    #[serde(default)]
    archived: bool,

    /// Audit timestamps.
    #[serde(flatten)]
    #[getter(skip)]
    audit: Audit,
}

/// Cached schema of `BookDto`.
static BOOK_DTO_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| book_schema("book_dtos").field(Field::text("author_name").derived()));

impl BookDto {
    /// Creates the transfer shape of `book`, whose author is named `author_name`.
    pub(crate) fn from_book(book: Book, author_name: String) -> Self {
        Self::new(
            book.id,
            book.title,
            book.author_id,
            author_name,
            book.pages,
            book.isbn,
            book.archived,
            book.audit,
        )
    }

    /// Converts this transfer shape into the book it represents.
    pub(crate) fn into_book(self) -> Book {
        Book::new(
            self.id,
            self.title,
            self.author_id,
            self.pages,
            self.isbn,
            self.archived,
            self.audit,
        )
    }
}

impl Shape for BookDto {
    type Key = i64;

    fn schema() -> &'static Schema {
        &BOOK_DTO_SCHEMA
    }

    fn key(&self) -> &i64 {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("title", self.title.as_str())
            .with("author_id", self.author_id)
            .with("author_name", self.author_name.as_str())
            .with("pages", self.pages)
            .with("isbn", self.isbn.as_str())
            .with("archived", self.archived)
    }

    fn validate_extra(&self) -> Vec<FieldError> {
        check_title(&self.title, &self.isbn)
    }
}
