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


//! API to list all visible entities.

use crate::driver::{Hooks, Projection, Service, Tier};
use crate::model::Entity;
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tiercrud_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    _: EmptyBody,
) -> RestResult<Response>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    let dtos = service.read_all().await?;
    if dtos.is_empty() {
        return Ok(http::StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(dtos).into_response())
}

#[cfg(test)]
mod tests {
    use crate::model::testutils::Widget;
    use crate::rest::testutils::*;
    use tiercrud_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/widgets".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001")).await;
        let nut = context.put(Widget::new("nut", 5, "NUT-001")).await;

        let response = OneShotBuilder::new(context.close_app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<Widget>>()
            .await;
        assert_eq!(vec![bolt, nut], response);
    }

    #[tokio::test]
    async fn test_empty() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.close_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
    }

    #[tokio::test]
    async fn test_read_filter_hides_everything() {
        let context = TestContext::setup().await;
        context.put(Widget::new("bolt", 0, "BLT-001")).await;

        OneShotBuilder::new(context.guarded_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
    }

    #[tokio::test]
    async fn test_mapped() {
        let context = TestContext::setup().await;
        context.put(Widget::new("bolt", 3, "BLT-001")).await;

        let response = OneShotBuilder::new(context.mapped_app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<serde_json::Value>>()
            .await;
        assert_eq!(1, response.len());
        assert_eq!("bolt [BLT-001] x1", response[0]["label"]);
    }

    test_payload_must_be_empty!(TestContext::setup().await.close_app(), route());
}
