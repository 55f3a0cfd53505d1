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


//! API to describe the fields required to create an entity.

use crate::driver::{CanWrite, Hooks, Projection, Service};
use crate::model::Entity;
use axum::Json;
use axum::extract::State;
use std::collections::BTreeMap;
use tiercrud_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    _: EmptyBody,
) -> RestResult<Json<BTreeMap<String, String>>>
where
    T: CanWrite,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    Ok(Json(service.property_info_for_create()))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use std::collections::BTreeMap;
    use tiercrud_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/widgets/new".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.open_app(), route())
            .send_empty()
            .await
            .expect_json::<BTreeMap<String, String>>()
            .await;
        let exp_response = BTreeMap::from([
            ("code".to_owned(), "string".to_owned()),
            ("name".to_owned(), "string".to_owned()),
            ("note".to_owned(), "string".to_owned()),
            ("quantity".to_owned(), "integer".to_owned()),
        ]);
        assert_eq!(exp_response, response);
    }

    test_payload_must_be_empty!(TestContext::setup().await.open_app(), route());
}
