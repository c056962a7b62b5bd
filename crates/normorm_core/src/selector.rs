//! Generated selectors over the normalized store.
//!
//! # Responsibility
//! - Single-id lookup returning one holder or nothing.
//! - Collection lookup over explicit or implicit id lists.
//!
//! # Invariants
//! - Missing tables and ids are normal outcomes, never errors.
//! - Collection results keep the relative order of the ids that resolved.
//! - Selectors only read the state snapshot.

use crate::entity::class::EntityClass;
use crate::entity::holder::EntityHolder;
use crate::generator::Orm;
use crate::store::StoreView;
use log::trace;
use serde_json::Value;

/// Selector bound to one entity class.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    orm: &'a Orm,
    class: &'a EntityClass,
}

impl<'a> Selector<'a> {
    pub(crate) fn new(orm: &'a Orm, class: &'a EntityClass) -> Self {
        Self { orm, class }
    }

    pub fn entity_name(&self) -> &'a str {
        self.class.name()
    }

    pub fn table(&self) -> &'a str {
        self.class.table()
    }

    /// Returns the holder for `id`, or `None` if the table or id is absent.
    pub fn select(&self, state: &'a Value, id: &Value) -> Option<EntityHolder<'a>> {
        let view = StoreView::new(state, self.orm.options().store_root_key.as_str());
        match view.record(self.class.table(), id) {
            Some(record) => Some(EntityHolder::new(self.orm, self.class, state, record)),
            None => {
                trace!(
                    "event=selector_miss module=selector status=skip entity={} id={}",
                    self.class.name(),
                    id
                );
                None
            }
        }
    }

    /// Returns holders for `ids`, silently dropping ids that do not resolve.
    ///
    /// `ids = None` selects every row of the table, or nothing when
    /// `empty_when_unspecified` is set.
    pub fn select_many(
        &self,
        state: &'a Value,
        ids: Option<&[Value]>,
        empty_when_unspecified: bool,
    ) -> Vec<EntityHolder<'a>> {
        let view = StoreView::new(state, self.orm.options().store_root_key.as_str());
        if view.table(self.class.table()).is_none() {
            return Vec::new();
        }

        match ids {
            Some(ids) => ids.iter().filter_map(|id| self.select(state, id)).collect(),
            None if empty_when_unspecified => Vec::new(),
            None => view
                .ids(self.class.table())
                .iter()
                .filter_map(|id| self.select(state, id))
                .collect(),
        }
    }

    /// Every row of the table.
    pub fn select_all(&self, state: &'a Value) -> Vec<EntityHolder<'a>> {
        self.select_many(state, None, false)
    }
}

/// Selector lookup by entity name or by table name.
#[derive(Debug, Clone, Copy)]
pub struct Selectors<'a> {
    orm: &'a Orm,
}

impl<'a> Selectors<'a> {
    pub(crate) fn new(orm: &'a Orm) -> Self {
        Self { orm }
    }

    pub fn by_entity(&self, entity: &str) -> Option<Selector<'a>> {
        let class = self.orm.class(entity)?;
        Some(Selector::new(self.orm, class))
    }

    pub fn by_table(&self, table: &str) -> Option<Selector<'a>> {
        let entity = self.orm.entity_for_table(table)?;
        self.by_entity(entity)
    }

    /// Looks up by entity name first, then by table name.
    pub fn get(&self, name: &str) -> Option<Selector<'a>> {
        self.by_entity(name).or_else(|| self.by_table(name))
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &'a str> {
        self.orm.classes().keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &'a str> {
        self.orm.classes().values().map(EntityClass::table)
    }
}
