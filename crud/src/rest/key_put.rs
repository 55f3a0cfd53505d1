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


//! API to update an existing entity.

use crate::driver::{CanUpdate, Hooks, Projection, Service};
use crate::model::{Entity, Shape};
use crate::rest::not_found;
use axum::Json;
use axum::extract::{Path, State};
use tiercrud_core::rest::{JsonPayload, RestResult};

/// API handler.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    Path(key): Path<E::Key>,
    JsonPayload(dto): JsonPayload<P::Dto>,
) -> RestResult<Json<P::Dto>>
where
    T: CanUpdate,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    match service.update(key.clone(), dto).await? {
        Some(dto) => Ok(Json(dto)),
        None => Err(not_found(E::schema(), &key)),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::testutils::Widget;
    use crate::rest::testutils::*;
    use serde_json::json;
    use std::time::Duration;
    use tiercrud_core::rest::testutils::*;

    fn route(key: i64) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/v1/widgets/{}", key))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001")).await;
        context.advance(Duration::from_secs(60));

        let mut modified = bolt.clone();
        modified.quantity = 8;
        modified.code = "BLT-999".to_owned();
        let response = OneShotBuilder::new(context.full_app(), route(bolt.id))
            .send_json(&modified)
            .await
            .expect_json::<Widget>()
            .await;
        assert_eq!(8, response.quantity);
        assert_eq!("BLT-001", response.code);
        assert_eq!(bolt.audit.created_at, response.audit.created_at);
        assert_eq!(context.now(), response.audit.last_updated);

        assert_eq!(Some(response), context.get(bolt.id).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let request = json!({"id": 256, "name": "bolt", "quantity": 3, "code": "BLT-001"});
        OneShotBuilder::new(context.full_app(), route(256))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("widgets 256 not found")
            .await;

        assert!(context.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_key_mismatch() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001")).await;

        let mut modified = bolt.clone();
        modified.quantity = 8;
        OneShotBuilder::new(context.full_app(), route(bolt.id + 1))
            .send_json(&modified)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Key mismatch")
            .await;

        assert_eq!(vec![bolt], context.all().await);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001")).await;

        let mut modified = bolt.clone();
        modified.name = "x".repeat(33);
        let errors = OneShotBuilder::new(context.full_app(), route(bolt.id))
            .send_json(&modified)
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_validation_errors()
            .await;
        assert_eq!(1, errors.len());
        assert_eq!("name", errors[0].field);
        assert_eq!("must be at most 32 characters long", errors[0].message);
    }

    #[tokio::test]
    async fn test_rejected_by_hooks() {
        let context = TestContext::setup().await;
        let locked = context.put(Widget::new("bolt", 3, "BLT-001").with_note("locked")).await;

        let mut modified = locked.clone();
        modified.quantity = 8;
        OneShotBuilder::new(context.guarded_app(), route(locked.id))
            .send_json(&modified)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("is locked")
            .await;
    }

    #[tokio::test]
    async fn test_not_available_on_open_tier() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001")).await;

        OneShotBuilder::new(context.open_app(), route(bolt.id))
            .send_json(&bolt)
            .await
            .expect_status(http::StatusCode::METHOD_NOT_ALLOWED)
            .expect_empty()
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.full_app(), route(1));

    test_payload_must_be_present!(TestContext::setup().await.full_app(), route(1));
}
