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


//! API to delete an entity by key.

use crate::driver::{CanWrite, Hooks, Projection, Service};
use crate::model::Entity;
use axum::extract::{Path, State};
use tiercrud_core::rest::{EmptyBody, RestResult};

/// API handler.
pub(crate) async fn handler<T, E, P, H>(
    State(service): State<Service<T, E, P, H>>,
    Path(key): Path<E::Key>,
    _: EmptyBody,
) -> RestResult<()>
where
    T: CanWrite,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    service.delete(key).await?;
    Ok(())
}
