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


//! API to describe the fields that can be provided on updates.

use crate::driver::{CanUpdate, Hooks, Projection, Service};
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
    T: CanUpdate,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    Ok(Json(service.property_info_for_update()))
}
