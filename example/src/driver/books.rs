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


//! Customizations of the generic operations for books.

use crate::model::{Author, Book, BookDto};
use async_trait::async_trait;
use tiercrud::db;
use tiercrud::driver::{Hooks, Projection};
use tiercrud::model::Condition;
use tiercrud_core::db::{DbResult, Executor};
use tiercrud_core::driver::{DriverError, DriverResult};
use tiercrud_core::model::ModelResult;

/// Projection that exposes books along with the name of their author.
pub(crate) struct BookMapper;

#[async_trait]
impl Projection<Book> for BookMapper {
    type Dto = BookDto;

    async fn to_dto(&self, ex: &mut Executor, book: Book) -> DbResult<BookDto> {
        let author_name = match db::get::<Author>(ex, book.author_id()).await? {
            Some(author) => author.name().clone(),
            None => String::new(),
        };
        Ok(BookDto::from_book(book, author_name))
    }

    fn to_domain(&self, dto: BookDto) -> ModelResult<Book> {
        Ok(dto.into_book())
    }
}

/// Hooks for books, which hide archived books from listings and freeze them.
pub(crate) struct BookHooks;

#[async_trait]
impl Hooks<Book> for BookHooks {
    fn read_filter(&self) -> Vec<Condition> {
        vec![Condition::eq("archived", false)]
    }

    async fn update_filter(
        &self,
        _ex: &mut Executor,
        original: &Book,
        _updated: &Book,
    ) -> DriverResult<()> {
        if *original.archived() {
            return Err(DriverError::InvalidOperation(format!(
                "Book {} is archived and cannot be modified",
                original.id()
            )));
        }
        Ok(())
    }
}
