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

//! Entity-specific extension points for the generic operations.

use crate::model::{Condition, Entity};
use async_trait::async_trait;
use tiercrud_core::db::Executor;
use tiercrud_core::driver::DriverResult;

/// Customizations of the generic operations for the entity `E`.
///
/// All methods default to no-ops.  Filters run inside the transaction of the operation they
/// guard and can veto it by returning an error, typically `DriverError::InvalidOperation`.
#[async_trait]
pub trait Hooks<E: Entity>: Send + Sync + 'static {
    /// Returns the conditions that restrict which entities `read_all` and `paginate` return.
    fn read_filter(&self) -> Vec<Condition> {
        vec![]
    }

    /// Decides whether `entity` may be deleted.
    async fn delete_filter(&self, _ex: &mut Executor, _entity: &E) -> DriverResult<()> {
        Ok(())
    }

    /// Decides whether `original` may be replaced by `updated`.
    async fn update_filter(
        &self,
        _ex: &mut Executor,
        _original: &E,
        _updated: &E,
    ) -> DriverResult<()> {
        Ok(())
    }

    /// Adjusts `updated` before it is written, such as to carry over business fields from
    /// `original` that callers cannot overwrite.
    fn update_preset(&self, _original: &E, _updated: &mut E) {}
}

/// Hooks that do not customize anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<E: Entity> Hooks<E> for NoHooks {}
