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

//! Mapping between stored entities and the shapes exposed to callers.

use crate::model::{Entity, Shape};
use async_trait::async_trait;
use tiercrud_core::db::{DbResult, Executor};
use tiercrud_core::model::ModelResult;

/// Converts entities of type `E` to and from a transfer shape.
///
/// Services call `to_domain` on every incoming payload before writing and `to_dto` on every
/// entity they return.
#[async_trait]
pub trait Projection<E: Entity>: Send + Sync + 'static {
    /// The shape exposed to callers.  It shares the key of the entity.
    type Dto: Shape<Key = E::Key>;

    /// Whether this projection hands out entities unchanged.
    const IDENTITY: bool = false;

    /// Converts an `entity` to its transfer shape.
    ///
    /// The executor `ex` belongs to the operation that loaded `entity` so that display fields
    /// derived from related entities can be computed consistently.
    async fn to_dto(&self, ex: &mut Executor, entity: E) -> DbResult<Self::Dto>;

    /// Converts a transfer shape to the entity it represents.  Derived fields are dropped.
    fn to_domain(&self, dto: Self::Dto) -> ModelResult<E>;
}

/// The projection that exposes entities as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

#[async_trait]
impl<E: Entity> Projection<E> for Identity {
    type Dto = E;

    const IDENTITY: bool = true;

    async fn to_dto(&self, _ex: &mut Executor, entity: E) -> DbResult<E> {
        Ok(entity)
    }

    fn to_domain(&self, dto: E) -> ModelResult<E> {
        Ok(dto)
    }
}
