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


//! API to check whether any entity matches a set of field values.

use crate::driver::{Hooks, Projection, Service, Tier};
use crate::model::{Condition, Entity, Shape};
use axum::Json;
use axum::extract::{Query, State};
use std::collections::BTreeMap;
use tiercrud_core::rest::{EmptyBody, RestError, RestResult};

/// API handler.
///
/// Every query parameter names a stored field and the value it must be equal to.  An empty query
/// matches any entity.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    Query(query): Query<BTreeMap<String, String>>,
    _: EmptyBody,
) -> RestResult<Json<bool>>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    let schema = E::schema();
    let mut conditions = Vec::with_capacity(query.len());
    for (field, raw) in query {
        let Some(kind) = schema.column_kind(&field) else {
            return Err(RestError::InvalidRequest(format!(
                "Unknown field {} in {}",
                field,
                schema.name()
            )));
        };
        let value = kind.parse(&raw)?;
        conditions.push(Condition::eq(field, value));
    }

    Ok(Json(service.exists_where(conditions).await?))
}

#[cfg(test)]
mod tests {
    use crate::model::testutils::Widget;
    use crate::rest::testutils::*;
    use tiercrud_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/widgets/exists".to_owned())
    }

    /// Sends a query for `params` and returns the answer.
    async fn query(context: &TestContext, params: &[(&str, &str)]) -> bool {
        OneShotBuilder::new(context.close_app(), route())
            .with_query(params)
            .send_empty()
            .await
            .expect_json::<bool>()
            .await
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let bolt = context.put(Widget::new("bolt", 3, "BLT-001").with_note("steel")).await;
        context.put(Widget::new("nut", 5, "NUT-001")).await;

        assert!(query(&context, &[("name", "bolt")]).await);
        assert!(query(&context, &[("name", "nut"), ("quantity", "5")]).await);
        assert!(!query(&context, &[("name", "nut"), ("quantity", "3")]).await);
        assert!(query(&context, &[("id", &bolt.id.to_string())]).await);
        assert!(!query(&context, &[("note", "brass")]).await);
    }

    #[tokio::test]
    async fn test_empty_query_matches_anything() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.close_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::OK)
            .expect_text("false")
            .await;

        context.put(Widget::new("bolt", 3, "BLT-001")).await;
        assert!(query(&context, &[]).await);
    }

    #[tokio::test]
    async fn test_unknown_field() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.close_app(), route())
            .with_query([("color", "red")])
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Unknown field color in widgets")
            .await;
    }

    #[tokio::test]
    async fn test_bad_value() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.close_app(), route())
            .with_query([("quantity", "many")])
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid integer 'many'")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.close_app(), route());
}
