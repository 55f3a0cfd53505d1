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

//! Test utilities for the services.

use crate::db;
use crate::driver::{CrudOptions, Hooks, Identity, NoHooks, Projection, Service, Tier};
use crate::model::testutils::{WIDGETS_SQLITE_SCHEMA, Widget};
use crate::model::{Audit, Condition, Field, Record, Schema, Shape};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tiercrud_core::clocks::Clock;
use tiercrud_core::clocks::testutils::SettableClock;
use tiercrud_core::db::{Db, DbResult, Executor, sqlite};
use tiercrud_core::driver::{DriverError, DriverResult};
use tiercrud_core::model::ModelResult;
use time::macros::datetime;

/// Transfer shape of `Widget` with a derived display label.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct WidgetView {
    /// Key of the widget.
    #[serde(default)]
    pub(crate) id: i64,

    /// Display name.
    pub(crate) name: String,

    /// Units in stock.
    pub(crate) quantity: i64,

    /// Catalog code.
    pub(crate) code: String,

    /// Free-form comment.
    #[serde(default)]
    pub(crate) note: Option<String>,

    /// Display label computed from the other fields and ignored on input.
    #[serde(default)]
    pub(crate) label: String,

    /// Audit timestamps.
    #[serde(flatten)]
    pub(crate) audit: Audit,
}

impl WidgetView {
    /// Creates a view for a widget that is not yet stored.
    pub(crate) fn new(name: &str, quantity: i64, code: &str) -> Self {
        Self {
            id: 0,
            name: name.to_owned(),
            quantity,
            code: code.to_owned(),
            note: None,
            label: String::new(),
            audit: Audit::default(),
        }
    }
}

/// Cached schema of `WidgetView`.
static WIDGET_VIEW_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new::<i64>("widget_views")
        .generated_key()
        .field(Field::text("name").required().max_length(32))
        .field(Field::integer("quantity").range(0, 1000))
        .field(Field::text("code").required().pattern("^[A-Z]{3}-[0-9]{3}$").immutable())
        .field(Field::text("note").optional())
        .field(Field::text("label").derived())
});

impl Shape for WidgetView {
    type Key = i64;

    fn schema() -> &'static Schema {
        &WIDGET_VIEW_SCHEMA
    }

    fn key(&self) -> &i64 {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("quantity", self.quantity)
            .with("code", self.code.as_str())
            .with("note", self.note.clone())
            .with("label", self.label.as_str())
    }
}

/// Projection from `Widget` to `WidgetView`.
///
/// The label includes how many widgets share the same name, which requires a query.
pub(crate) struct LabelMapper;

#[async_trait]
impl Projection<Widget> for LabelMapper {
    type Dto = WidgetView;

    async fn to_dto(&self, ex: &mut Executor, widget: Widget) -> DbResult<WidgetView> {
        let same_name = [Condition::eq("name", widget.name.as_str())];
        let peers = db::count::<Widget>(ex, &same_name).await?;
        Ok(WidgetView {
            label: format!("{} [{}] x{}", widget.name, widget.code, peers),
            id: widget.id,
            name: widget.name,
            quantity: widget.quantity,
            code: widget.code,
            note: widget.note,
            audit: widget.audit,
        })
    }

    fn to_domain(&self, view: WidgetView) -> ModelResult<Widget> {
        Ok(Widget {
            id: view.id,
            name: view.name,
            quantity: view.quantity,
            code: view.code,
            note: view.note,
            audit: view.audit,
        })
    }
}

/// Hooks that hide out-of-stock widgets from listings, protect widgets whose note says
/// `locked` and keep notes unchanged across updates.
pub(crate) struct GuardHooks;

/// Fails if `widget` is locked.
fn check_unlocked(widget: &Widget) -> DriverResult<()> {
    if widget.note.as_deref() == Some("locked") {
        return Err(DriverError::InvalidOperation(format!("Widget {} is locked", widget.id)));
    }
    Ok(())
}

#[async_trait]
impl Hooks<Widget> for GuardHooks {
    fn read_filter(&self) -> Vec<Condition> {
        vec![Condition::gt("quantity", 0)]
    }

    async fn delete_filter(&self, _ex: &mut Executor, widget: &Widget) -> DriverResult<()> {
        check_unlocked(widget)
    }

    async fn update_filter(
        &self,
        _ex: &mut Executor,
        original: &Widget,
        _updated: &Widget,
    ) -> DriverResult<()> {
        check_unlocked(original)
    }

    fn update_preset(&self, original: &Widget, updated: &mut Widget) {
        updated.note = original.note.clone();
    }
}

/// Container for the state required to run a driver test.
pub(crate) struct TestContext {
    /// The database backing the services.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the services.
    clock: Arc<SettableClock>,
}

impl TestContext {
    /// Creates a new in-memory database with the `widgets` table and a fixed clock.
    pub(crate) async fn setup() -> Self {
        let db = sqlite::testutils::setup().await;
        {
            let mut ex = db.typed_ex().await.unwrap();
            sqlite::run_schema(&mut ex, WIDGETS_SQLITE_SCHEMA).await.unwrap();
        }
        let db: Arc<dyn Db + Send + Sync> = Arc::new(db);
        let clock = Arc::new(SettableClock::new(datetime!(2023-06-01 10:00:00 UTC)));
        Self { db, clock }
    }

    /// Returns the database.
    pub(crate) fn db(&self) -> Arc<dyn Db + Send + Sync> {
        self.db.clone()
    }

    /// Returns the clock as the services see it.
    pub(crate) fn clock(&self) -> Arc<SettableClock> {
        self.clock.clone()
    }

    /// Returns a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Returns a service for widgets at tier `T` without mapper nor hooks.
    pub(crate) fn service<T: Tier>(&self) -> Service<T, Widget> {
        Service::with_defaults(self.db.clone(), self.clock.clone(), CrudOptions::default())
    }

    /// Returns a service for widgets at tier `T` that exposes them as `WidgetView`s.
    pub(crate) fn mapped_service<T: Tier>(&self) -> Service<T, Widget, LabelMapper, NoHooks> {
        Service::new(
            self.db.clone(),
            self.clock.clone(),
            LabelMapper,
            NoHooks,
            CrudOptions::default(),
        )
        .unwrap()
    }

    /// Returns a service for widgets at tier `T` customized with `GuardHooks`.
    pub(crate) fn guarded_service<T: Tier>(&self) -> Service<T, Widget, Identity, GuardHooks> {
        Service::new(
            self.db.clone(),
            self.clock.clone(),
            Identity,
            GuardHooks,
            CrudOptions::default(),
        )
        .unwrap()
    }

    /// Stores `widget` directly in the database with both timestamps set to the current time
    /// of the clock, and returns it with its assigned key.
    pub(crate) async fn put(&self, mut widget: Widget) -> Widget {
        widget.audit = Audit::new(self.clock.now_utc());
        let mut tx = self.db.begin().await.unwrap();
        widget.id = db::insert(tx.ex(), &widget).await.unwrap();
        tx.commit().await.unwrap();
        widget
    }

    /// Reads the widget identified by `id` directly from the database.
    pub(crate) async fn get(&self, id: i64) -> Option<Widget> {
        db::get::<Widget>(&mut self.ex().await, &id).await.unwrap()
    }

    /// Reads all widgets directly from the database.
    pub(crate) async fn all(&self) -> Vec<Widget> {
        db::find_many::<Widget>(&mut self.ex().await, &[], None).await.unwrap()
    }
}
