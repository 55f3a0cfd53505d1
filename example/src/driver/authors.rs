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


//! Customizations of the generic operations for authors.

use crate::model::{Author, Book};
use async_trait::async_trait;
use tiercrud::db;
use tiercrud::driver::Hooks;
use tiercrud::model::Condition;
use tiercrud_core::db::Executor;
use tiercrud_core::driver::{DriverError, DriverResult};

/// Hooks for authors.
pub(crate) struct AuthorHooks;

#[async_trait]
impl Hooks<Author> for AuthorHooks {
    async fn delete_filter(&self, ex: &mut Executor, author: &Author) -> DriverResult<()> {
        let by_author = [Condition::eq("author_id", *author.id())];
        let books = db::count::<Book>(ex, &by_author).await?;
        if books > 0 {
            return Err(DriverError::InvalidOperation(format!(
                "Author {} still has {} books in the catalog",
                author.id(),
                books
            )));
        }
        Ok(())
    }
}
