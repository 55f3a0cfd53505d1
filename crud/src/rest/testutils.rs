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


//! Test utilities for the REST controllers.

use crate::driver::testutils::TestContext as DriverContext;
use crate::driver::{Close, Full, Open};
use crate::model::testutils::Widget;
use crate::rest::{close_router, full_router, open_router};
use axum::Router;
use std::time::Duration;
use tiercrud_core::clocks::Clock;
use time::OffsetDateTime;

/// Prefix under which all test routers are nested.
const PREFIX: &str = "/api/v1/widgets";

/// State of a REST test: the database and clock behind the routers.
pub(crate) struct TestContext {
    /// Context of the services exposed by the routers.
    driver: DriverContext,
}

impl TestContext {
    /// Creates a new context backed by an empty in-memory database.
    pub(crate) async fn setup() -> Self {
        Self { driver: DriverContext::setup().await }
    }

    /// Nests `router` under the prefix that tests use.
    fn nest(router: Router) -> Router {
        Router::new().nest(PREFIX, router)
    }

    /// Returns an app that exposes the read-only operations on widgets.
    pub(crate) fn close_app(&self) -> Router {
        Self::nest(close_router(self.driver.service::<Close>()))
    }

    /// Returns an app that exposes the read, create and delete operations on widgets.
    pub(crate) fn open_app(&self) -> Router {
        Self::nest(open_router(self.driver.service::<Open>()))
    }

    /// Returns an app that exposes all operations on widgets.
    pub(crate) fn full_app(&self) -> Router {
        Self::nest(full_router(self.driver.service::<Full>()))
    }

    /// Returns an app that exposes all operations on widgets through `WidgetView`s.
    pub(crate) fn mapped_app(&self) -> Router {
        Self::nest(full_router(self.driver.mapped_service::<Full>()))
    }

    /// Returns an app that exposes all operations on widgets customized with `GuardHooks`.
    pub(crate) fn guarded_app(&self) -> Router {
        Self::nest(full_router(self.driver.guarded_service::<Full>()))
    }

    /// Returns the current time as seen by the services.
    pub(crate) fn now(&self) -> OffsetDateTime {
        self.driver.clock().now_utc()
    }

    /// Advances the clock seen by the services by `delta`.
    pub(crate) fn advance(&self, delta: Duration) {
        self.driver.clock().advance(delta)
    }

    /// Stores `widget` directly in the database and returns it with its assigned key.
    pub(crate) async fn put(&self, widget: Widget) -> Widget {
        self.driver.put(widget).await
    }

    /// Reads the widget identified by `id` directly from the database.
    pub(crate) async fn get(&self, id: i64) -> Option<Widget> {
        self.driver.get(id).await
    }

    /// Reads all widgets directly from the database.
    pub(crate) async fn all(&self) -> Vec<Widget> {
        self.driver.all().await
    }
}
