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

//! Operations available on tiers that can create and delete entities.

use crate::db;
use crate::driver::{CanWrite, Hooks, Projection, Service};
use crate::model::{Audit, Entity, Shape};
use std::collections::BTreeMap;
use tiercrud_core::driver::{DriverError, DriverResult};

impl<T, E, P, H> Service<T, E, P, H>
where
    T: CanWrite,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    /// Creates a new entity from `dto` and returns it as stored.
    ///
    /// Both audit timestamps are set to the current time and any key in `dto` is ignored if the
    /// database generates keys.
    pub async fn create(self, dto: P::Dto) -> DriverResult<P::Dto> {
        let detail = dto.key().to_string();
        self.logged("create", &detail, async {
            dto.validate()?;
            let mut entity = self.projection.to_domain(dto)?;
            if !P::IDENTITY {
                entity.validate()?;
            }
            entity.set_audit(Audit::new(self.clock.now_utc()));

            let mut tx = self.db.begin().await?;
            let key = db::insert(tx.ex(), &entity).await?;
            let Some(entity) = db::get::<E>(tx.ex(), &key).await? else {
                return Err(DriverError::BackendError(format!(
                    "Entity {} vanished right after its creation",
                    key
                )));
            };
            let dto = self.projection.to_dto(tx.ex(), entity).await?;
            tx.commit().await?;
            Ok(dto)
        })
        .await
    }

    /// Deletes the entity represented by `dto`.
    pub async fn delete_entity(self, dto: P::Dto) -> DriverResult<()> {
        let key = dto.key().clone();
        self.delete(key).await
    }

    /// Deletes the entity identified by `key`.
    pub async fn delete(self, key: E::Key) -> DriverResult<()> {
        self.logged("delete", &key, async {
            Self::check_key(&key)?;

            let mut tx = self.db.begin().await?;
            let Some(entity) = db::get::<E>(tx.ex(), &key).await? else {
                return Err(DriverError::NotFound(format!(
                    "{} {} not found",
                    E::schema().name(),
                    key
                )));
            };
            self.hooks.delete_filter(tx.ex(), &entity).await?;
            db::delete::<E>(tx.ex(), &key).await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    /// Returns the names and types of the fields that clients must provide on creation.
    pub fn property_info_for_create(&self) -> BTreeMap<String, String> {
        P::Dto::schema().property_info_for_create()
    }
}
