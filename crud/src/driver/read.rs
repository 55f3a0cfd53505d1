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

//! Operations available on every tier.

use crate::db::{self, Window};
use crate::driver::{Hooks, Projection, Service, Tier};
use crate::model::{Condition, Entity, KEY_COLUMN, Key};
use tiercrud_core::db::Executor;
use tiercrud_core::driver::{DriverError, DriverResult};

impl<T, E, P, H> Service<T, E, P, H>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    /// Converts all `entities` to their transfer shape using `ex` for any lookups.
    async fn project_all(
        &self,
        ex: &mut Executor,
        entities: Vec<E>,
    ) -> DriverResult<Vec<P::Dto>> {
        let mut dtos = Vec::with_capacity(entities.len());
        for entity in entities {
            dtos.push(self.projection.to_dto(ex, entity).await?);
        }
        Ok(dtos)
    }

    /// Returns all entities visible through the read filter, sorted by key.
    pub async fn read_all(self) -> DriverResult<Vec<P::Dto>> {
        self.logged("read_all", &"*", async {
            let mut ex = self.db.ex().await?;
            let entities = db::find_many::<E>(&mut ex, &self.hooks.read_filter(), None).await?;
            self.project_all(&mut ex, entities).await
        })
        .await
    }

    /// Returns the entity identified by `key`, if any.
    pub async fn read(self, key: E::Key) -> DriverResult<Option<P::Dto>> {
        self.logged("read", &key, async {
            Self::check_key(&key)?;

            let mut ex = self.db.ex().await?;
            match db::get::<E>(&mut ex, &key).await? {
                Some(entity) => Ok(Some(self.projection.to_dto(&mut ex, entity).await?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Returns the `page`th group of `number` entities visible through the read filter, counting
    /// pages from zero.
    pub async fn paginate(self, number: i64, page: i64) -> DriverResult<Vec<P::Dto>> {
        let detail = format!("number={} page={}", number, page);
        self.logged("paginate", &detail, async {
            if number < 1 {
                return Err(DriverError::InvalidInput(format!(
                    "Page size must be positive but got {}",
                    number
                )));
            }
            if page < 0 {
                return Err(DriverError::InvalidInput(format!(
                    "Page number cannot be negative but got {}",
                    page
                )));
            }
            let Some(offset) = page.checked_mul(number) else {
                return Err(DriverError::InvalidInput(format!(
                    "Page {} of size {} is out of range",
                    page, number
                )));
            };

            let mut ex = self.db.ex().await?;
            let window = Window { limit: number, offset };
            let entities =
                db::find_many::<E>(&mut ex, &self.hooks.read_filter(), Some(window)).await?;
            self.project_all(&mut ex, entities).await
        })
        .await
    }

    /// Checks whether the entity identified by `key` exists.
    pub async fn exists(self, key: E::Key) -> DriverResult<bool> {
        self.logged("exists", &key, async {
            Self::check_key(&key)?;

            let mut ex = self.db.ex().await?;
            let by_key = [Condition::eq(KEY_COLUMN, key.to_value())];
            Ok(db::exists::<E>(&mut ex, &by_key).await?)
        })
        .await
    }

    /// Checks whether any entity matches all `conditions`.
    pub async fn exists_where(self, conditions: Vec<Condition>) -> DriverResult<bool> {
        self.logged("exists_where", &ConditionList(&conditions), async {
            Self::check_conditions(&conditions)?;

            let mut ex = self.db.ex().await?;
            Ok(db::exists::<E>(&mut ex, &conditions).await?)
        })
        .await
    }

    /// Returns all entities that match all `conditions`, sorted by key.
    pub async fn find_many_with(self, conditions: Vec<Condition>) -> DriverResult<Vec<P::Dto>> {
        self.logged("find_many_with", &ConditionList(&conditions), async {
            Self::check_conditions(&conditions)?;

            let mut ex = self.db.ex().await?;
            let entities = db::find_many::<E>(&mut ex, &conditions, None).await?;
            self.project_all(&mut ex, entities).await
        })
        .await
    }

    /// Returns the entity with the lowest key among those that match all `conditions`.
    pub async fn find_one_with(self, conditions: Vec<Condition>) -> DriverResult<Option<P::Dto>> {
        self.logged("find_one_with", &ConditionList(&conditions), async {
            Self::check_conditions(&conditions)?;

            let mut ex = self.db.ex().await?;
            match db::find_one::<E>(&mut ex, &conditions).await? {
                Some(entity) => Ok(Some(self.projection.to_dto(&mut ex, entity).await?)),
                None => Ok(None),
            }
        })
        .await
    }
}

/// Formats a list of conditions for the logs.
struct ConditionList<'a>(&'a [Condition]);

impl std::fmt::Display for ConditionList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self.0.iter().map(Condition::to_string).collect::<Vec<_>>();
        write!(f, "[{}]", parts.join(", "))
    }
}
