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


//! REST interface for the catalog.

use crate::driver::Services;
use axum::Router;
use tiercrud::rest::{close_router, full_router, open_router};
use tower_http::cors::CorsLayer;

/// Creates the router for the application.
pub(crate) fn app(services: Services) -> Router {
    Router::new()
        .nest("/api/v1/authors", open_router(services.authors))
        .nest("/api/v1/books", full_router(services.books))
        .nest("/api/v1/catalog", close_router(services.catalog))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::TestContext;
    use crate::model::{Author, Book, BookDto};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tiercrud_core::rest::testutils::*;

    #[tokio::test]
    async fn test_create_and_read_book() {
        let context = TestContext::setup().await;
        let app = app(context.services());

        let author = OneShotBuilder::new(app.clone(), (http::Method::POST, "/api/v1/authors"))
            .send_json(json!({"name": "Frank Herbert", "country": "US"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Author>()
            .await;
        assert_eq!(&Some("US".to_owned()), author.country());

        let request = json!({
            "title": "Dune",
            "author_id": author.id(),
            "pages": 412,
            "isbn": "9780441013593",
        });
        let created = OneShotBuilder::new(app.clone(), (http::Method::POST, "/api/v1/books"))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<BookDto>()
            .await;
        assert_eq!("Frank Herbert", created.author_name());
        assert!(!created.archived());

        let uri = format!("/api/v1/books/{}", created.id());
        let read = OneShotBuilder::new(app, (http::Method::GET, uri))
            .send_empty()
            .await
            .expect_json::<BookDto>()
            .await;
        assert_eq!(created, read);
    }

    #[tokio::test]
    async fn test_create_book_for_missing_author() {
        let context = TestContext::setup().await;

        let request = json!({
            "title": "Dune",
            "author_id": 256,
            "pages": 412,
            "isbn": "9780441013593",
        });
        OneShotBuilder::new(app(context.services()), (http::Method::POST, "/api/v1/books"))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("Constraint violation")
            .await;
    }

    #[tokio::test]
    async fn test_books_hide_archived_but_catalog_shows_all() {
        let context = TestContext::setup().await;
        let author = context.put_author("Frank Herbert").await;
        let dune = context.put_book("Dune", *author.id(), "9780441013593").await;
        context.put_archived_book("Dune Messiah", *author.id(), "9780441172719").await;

        let app = app(context.services());

        let books = OneShotBuilder::new(app.clone(), (http::Method::GET, "/api/v1/books"))
            .send_empty()
            .await
            .expect_json::<Vec<BookDto>>()
            .await;
        assert_eq!(vec![*dune.id()], books.iter().map(|b| *b.id()).collect::<Vec<_>>());

        let all = OneShotBuilder::new(app, (http::Method::GET, "/api/v1/catalog"))
            .send_empty()
            .await
            .expect_json::<Vec<Book>>()
            .await;
        assert_eq!(2, all.len());
        assert!(all.iter().all(|b| b.author_id() == author.id()));
    }

    #[tokio::test]
    async fn test_update_book_keeps_isbn() {
        let context = TestContext::setup().await;
        let author = context.put_author("Frank Herbert").await;
        let book = context.put_book("Dune", *author.id(), "9780441013593").await;

        let uri = format!("/api/v1/books/{}", book.id());
        let request = json!({
            "id": book.id(),
            "title": "Dune (revised)",
            "author_id": author.id(),
            "pages": 500,
            "isbn": "9780000000002",
        });
        let updated = OneShotBuilder::new(app(context.services()), (http::Method::PUT, uri))
            .send_json(request)
            .await
            .expect_json::<BookDto>()
            .await;
        assert_eq!("Dune (revised)", updated.title());
        assert_eq!(500, *updated.pages());
        assert_eq!("9780441013593", updated.isbn());
    }

    #[tokio::test]
    async fn test_delete_author_with_books() {
        let context = TestContext::setup().await;
        let author = context.put_author("Frank Herbert").await;
        context.put_book("Dune", *author.id(), "9780441013593").await;

        let uri = format!("/api/v1/authors/{}", author.id());
        OneShotBuilder::new(app(context.services()), (http::Method::DELETE, uri))
            .send_empty()
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("still has 1 books")
            .await;
    }

    #[tokio::test]
    async fn test_tiers_limit_methods() {
        let context = TestContext::setup().await;
        let author = context.put_author("Frank Herbert").await;

        let uri = format!("/api/v1/authors/{}", author.id());
        OneShotBuilder::new(app(context.services()), (http::Method::PUT, uri))
            .send_json(json!({"id": author.id(), "name": "F. Herbert"}))
            .await
            .expect_status(http::StatusCode::METHOD_NOT_ALLOWED)
            .expect_empty()
            .await;

        OneShotBuilder::new(app(context.services()), (http::Method::POST, "/api/v1/catalog"))
            .send_json(json!({"title": "Dune"}))
            .await
            .expect_status(http::StatusCode::METHOD_NOT_ALLOWED)
            .expect_empty()
            .await;

        OneShotBuilder::new(app(context.services()), (http::Method::GET, "/api/v1/authors/edit"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_text("Cannot parse")
            .await;
    }

    #[tokio::test]
    async fn test_property_info() {
        let context = TestContext::setup().await;

        let route = (http::Method::GET, "/api/v1/books/new");
        let info = OneShotBuilder::new(app(context.services()), route)
            .send_empty()
            .await
            .expect_json::<BTreeMap<String, String>>()
            .await;
        let names = info.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(vec!["archived", "author_id", "isbn", "pages", "title"], names);
    }
}
