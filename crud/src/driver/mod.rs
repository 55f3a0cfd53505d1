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

//! Business logic shared by all entities.
//!
//! The public operations exposed by a `Service` are all "one shot": they start and commit a
//! transaction (or grab a pooled connection for reads), so it's incorrect for the caller to use
//! two separate calls.  For this reason, these operations consume the service in an attempt to
//! minimize the possibility of executing two operations.
//!
//! The tier of a service is a type-level marker.  Read operations are available on every tier,
//! creation and deletion only on tiers that implement `CanWrite`, and updates only on tiers that
//! implement `CanUpdate`.

use crate::model::{Condition, Entity, Key, Shape};
use derivative::Derivative;
use log::{debug, warn};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tiercrud_core::clocks::Clock;
use tiercrud_core::db::Db;
use tiercrud_core::driver::{DriverError, DriverResult};
use tiercrud_core::env::get_optional_var;

mod full;
mod hooks;
pub use hooks::{Hooks, NoHooks};
mod open;
mod projection;
pub use projection::{Identity, Projection};
mod read;
#[cfg(test)]
pub(crate) mod testutils;

/// Marker for the capability tier of a service.
pub trait Tier: Send + Sync + 'static {
    /// Name of the tier for diagnostics.
    const NAME: &'static str;
}

/// Marker for tiers that can create and delete entities.
pub trait CanWrite: Tier {}

/// Marker for tiers that can update entities.
pub trait CanUpdate: CanWrite {}

/// Read-only tier.
pub enum Close {}

impl Tier for Close {
    const NAME: &'static str = "close";
}

/// Tier that can read, create and delete.
pub enum Open {}

impl Tier for Open {
    const NAME: &'static str = "open";
}

impl CanWrite for Open {}

/// Tier that can read, create, delete and update.
pub enum Full {}

impl Tier for Full {
    const NAME: &'static str = "full";
}

impl CanWrite for Full {}

impl CanUpdate for Full {}

/// Configuration options for a service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrudOptions {
    /// Whether the service may use a projection other than the identity.
    pub mapper_enabled: bool,

    /// Whether the service logs its operations.
    pub logging_enabled: bool,
}

impl Default for CrudOptions {
    fn default() -> Self {
        Self { mapper_enabled: true, logging_enabled: true }
    }
}

impl CrudOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_USE_MAPPER` and `<prefix>_USE_LOGGER`.  Unset
    /// variables keep their default values.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            mapper_enabled: get_optional_var::<bool>(prefix, "USE_MAPPER")?
                .unwrap_or(defaults.mapper_enabled),
            logging_enabled: get_optional_var::<bool>(prefix, "USE_LOGGER")?
                .unwrap_or(defaults.logging_enabled),
        })
    }
}

/// Business logic for the entity `E` at tier `T`, exposing the entity through the projection `P`
/// and customized by the hooks `H`.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Service<T, E, P = Identity, H = NoHooks> {
    /// The database that the service uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock from which to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Mapper between entities and the shape exposed to callers.
    projection: Arc<P>,

    /// Entity-specific extension points.
    hooks: Arc<H>,

    /// Configuration of the service.
    opts: CrudOptions,

    /// Markers for the tier and the entity.
    _phantom: PhantomData<fn() -> (T, E)>,
}

/// A read-only service.
pub type CloseService<E, P = Identity, H = NoHooks> = Service<Close, E, P, H>;

/// A service that can read, create and delete.
pub type OpenService<E, P = Identity, H = NoHooks> = Service<Open, E, P, H>;

/// A service that can read, create, delete and update.
pub type FullService<E, P = Identity, H = NoHooks> = Service<Full, E, P, H>;

impl<T, E> Service<T, E, Identity, NoHooks>
where
    T: Tier,
    E: Entity,
{
    /// Creates a new service that exposes entities as they are stored and that has no hooks.
    pub fn with_defaults(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: CrudOptions,
    ) -> Self {
        Self {
            db,
            clock,
            projection: Arc::new(Identity),
            hooks: Arc::new(NoHooks),
            opts,
            _phantom: PhantomData,
        }
    }
}

impl<T, E, P, H> Service<T, E, P, H>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    /// Creates a new service backed by the given injected components.
    ///
    /// Fails if `projection` is not the identity but `opts` disable mappers.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        projection: P,
        hooks: H,
        opts: CrudOptions,
    ) -> DriverResult<Self> {
        if !opts.mapper_enabled && !P::IDENTITY {
            return Err(DriverError::InvalidInput(format!(
                "Cannot create a service for {} with a mapper because mappers are disabled",
                E::schema().name()
            )));
        }

        Ok(Self {
            db,
            clock,
            projection: Arc::new(projection),
            hooks: Arc::new(hooks),
            opts,
            _phantom: PhantomData,
        })
    }

    /// Returns the configuration of the service.
    pub fn opts(&self) -> &CrudOptions {
        &self.opts
    }

    /// Runs the operation `op` on the entity identified by `detail`, logging its start and its
    /// failure if logging is enabled.
    async fn logged<R, F>(
        &self,
        op: &str,
        detail: &(dyn fmt::Display + Sync),
        work: F,
    ) -> DriverResult<R>
    where
        F: Future<Output = DriverResult<R>>,
    {
        let name = E::schema().name();
        if self.opts.logging_enabled {
            debug!("[{}:{}] {} {}", T::NAME, name, op, detail);
        }
        let result = work.await;
        if self.opts.logging_enabled {
            if let Err(e) = &result {
                warn!("[{}:{}] {} {} failed: {}", T::NAME, name, op, detail, e);
            }
        }
        result
    }

    /// Rejects keys that cannot identify any entity.
    fn check_key(key: &E::Key) -> DriverResult<()> {
        if key.is_blank() {
            return Err(DriverError::MissingArgument("key"));
        }
        Ok(())
    }

    /// Rejects conditions that do not apply to the columns of the entity.
    fn check_conditions(conditions: &[Condition]) -> DriverResult<()> {
        let schema = E::schema();
        for condition in conditions {
            schema.check_condition(condition)?;
        }
        Ok(())
    }
}
