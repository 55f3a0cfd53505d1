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


//! API to get a page of visible entities.

use crate::driver::{Hooks, Projection, Service, Tier};
use crate::model::Entity;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tiercrud_core::rest::{EmptyBody, RestResult};

/// Query parameters for this API.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub(crate) struct PageQuery {
    /// Maximum number of entities to return.
    number: i64,

    /// Zero-based index of the page to return.
    page: i64,
}

/// API handler.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    Query(query): Query<PageQuery>,
    _: EmptyBody,
) -> RestResult<Response>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    let dtos = service.paginate(query.number, query.page).await?;
    if dtos.is_empty() {
        return Ok(http::StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(dtos).into_response())
}
