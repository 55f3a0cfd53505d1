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

//! HTTP controllers for the tiers of a service.
//!
//! Each router exposes the operations of one tier with paths relative to wherever the router is
//! nested, which is typically a per-entity prefix like `/api/v1/books`.

use crate::driver::{CanUpdate, CanWrite, Hooks, Projection, Service, Tier};
use crate::model::{Entity, Schema};
use axum::Router;
use axum::routing::{MethodRouter, get};
use tiercrud_core::rest::RestError;

mod edit_get;
mod exists_get;
mod exists_key_get;
mod key_delete;
mod key_get;
mod key_put;
mod new_get;
mod paginate_get;
mod root_delete;
mod root_get;
mod root_post;
#[cfg(test)]
mod testutils;

/// Builds the error returned when the entity identified by `key` does not exist.
fn not_found(schema: &Schema, key: &dyn std::fmt::Display) -> RestError {
    RestError::NotFound(format!("{} {} not found", schema.name(), key))
}

/// Shorthand for the router type whose state is a service.
type ServiceRouter<T, E, P, H> = Router<Service<T, E, P, H>>;

/// Method router for `/` on a read-only tier.
fn root_routes<T, E, P, H>() -> MethodRouter<Service<T, E, P, H>>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    get(root_get::handler::<T, E, P, H>)
}

/// Method router for `/:key` on a read-only tier.
fn key_routes<T, E, P, H>() -> MethodRouter<Service<T, E, P, H>>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    get(key_get::handler::<T, E, P, H>)
}

/// Adds the routes that do not depend on the tier to `router`.
fn with_read_routes<T, E, P, H>(router: ServiceRouter<T, E, P, H>) -> ServiceRouter<T, E, P, H>
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    router
        .route("/paginate", get(paginate_get::handler::<T, E, P, H>))
        .route("/exists", get(exists_get::handler::<T, E, P, H>))
        .route("/exists/:key", get(exists_key_get::handler::<T, E, P, H>))
}

/// Creates a router that exposes the read-only operations of `service`.
pub fn close_router<T, E, P, H>(service: Service<T, E, P, H>) -> Router
where
    T: Tier,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    with_read_routes(
        Router::new()
            .route("/", root_routes())
            .route("/:key", key_routes()),
    )
    .with_state(service)
}

/// Creates a router that exposes the read, create and delete operations of `service`.
pub fn open_router<T, E, P, H>(service: Service<T, E, P, H>) -> Router
where
    T: CanWrite,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    with_read_routes(
        Router::new()
            .route(
                "/",
                root_routes()
                    .post(root_post::handler::<T, E, P, H>)
                    .delete(root_delete::handler::<T, E, P, H>),
            )
            .route("/:key", key_routes().delete(key_delete::handler::<T, E, P, H>))
            .route("/new", get(new_get::handler::<T, E, P, H>)),
    )
    .with_state(service)
}

/// Creates a router that exposes all operations of `service`.
pub fn full_router<T, E, P, H>(service: Service<T, E, P, H>) -> Router
where
    T: CanUpdate,
    E: Entity,
    P: Projection<E>,
    H: Hooks<E>,
{
    with_read_routes(
        Router::new()
            .route(
                "/",
                root_routes()
                    .post(root_post::handler::<T, E, P, H>)
                    .delete(root_delete::handler::<T, E, P, H>),
            )
            .route(
                "/:key",
                key_routes()
                    .put(key_put::handler::<T, E, P, H>)
                    .delete(key_delete::handler::<T, E, P, H>),
            )
            .route("/new", get(new_get::handler::<T, E, P, H>))
            .route("/edit", get(edit_get::handler::<T, E, P, H>)),
    )
    .with_state(service)
}
