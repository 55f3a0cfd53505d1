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

//! Operations available on tiers that can update entities.

use crate::db;
use crate::driver::{CanUpdate, Hooks, Projection, Service};
use crate::model::{Audit, Entity, Shape};
use std::collections::BTreeMap;
use tiercrud_core::driver::{DriverError, DriverResult};

impl<T, E, P, H> Service<T, E, P, H>
where
    T: CanUpdate,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    /// Replaces the entity identified by `key` with the contents of `dto`.
    ///
    /// Returns `None` if there is no such entity.  Immutable fields and the creation timestamp
    /// keep their stored values, and the write fails with a conflict if the entity changed since
    /// it was loaded.
    pub async fn update(self, key: E::Key, dto: P::Dto) -> DriverResult<Option<P::Dto>> {
        self.logged("update", &key, async {
            Self::check_key(&key)?;
            if dto.key() != &key {
                return Err(DriverError::KeyMismatch {
                    key: key.to_string(),
                    payload: dto.key().to_string(),
                });
            }

            let mut tx = self.db.begin().await?;
            let Some(original) = db::get::<E>(tx.ex(), &key).await? else {
                return Ok(None);
            };

            dto.validate()?;
            let mut updated = self.projection.to_domain(dto)?;
            if !P::IDENTITY {
                updated.validate()?;
            }

            self.hooks.update_filter(tx.ex(), &original, &updated).await?;
            self.hooks.update_preset(&original, &mut updated);

            let token = original.audit().last_updated;
            updated.set_audit(Audit {
                created_at: original.audit().created_at,
                last_updated: self.clock.now_utc(),
            });
            db::update(tx.ex(), &updated, token).await?;

            let Some(stored) = db::get::<E>(tx.ex(), &key).await? else {
                return Err(DriverError::BackendError(format!(
                    "Entity {} vanished right after its update",
                    key
                )));
            };
            let dto = self.projection.to_dto(tx.ex(), stored).await?;
            tx.commit().await?;
            Ok(Some(dto))
        })
        .await
    }

    /// Returns the names and types of the fields that clients can provide on updates.
    pub fn property_info_for_update(&self) -> BTreeMap<String, String> {
        P::Dto::schema().property_info_for_update()
    }
}
