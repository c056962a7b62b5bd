//! Per-read entity holders and association traversal.
//!
//! # Responsibility
//! - Pair one borrowed record with its state snapshot and projected fields.
//! - Traverse resolved associations through the generated selectors.
//!
//! # Invariants
//! - Holders are created per read, never cached, never mutated.
//! - Absent references traverse to nothing (no holder, empty list).
//! - An embedded `{ id, schema }` pair on a union value wins over the static
//!   union target.

use crate::entity::class::{EntityClass, HolderFields};
use crate::generator::Orm;
use crate::schema::resolve::{Association, UnionTarget};
use crate::store::Record;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Debug, Formatter};

/// Embedded id field of a normalized union value.
pub const UNION_ID_FIELD: &str = "id";
/// Embedded tag field of a normalized union value.
pub const UNION_SCHEMA_FIELD: &str = "schema";

/// Result of traversing one association.
#[derive(Debug, Clone)]
pub enum Related<'a> {
    One(Option<EntityHolder<'a>>),
    Many(Vec<EntityHolder<'a>>),
}

/// Hydrated view of one record.
#[derive(Clone)]
pub struct EntityHolder<'a> {
    orm: &'a Orm,
    class: &'a EntityClass,
    state: &'a Value,
    record: &'a Record,
    fields: HolderFields,
}

impl<'a> EntityHolder<'a> {
    pub(crate) fn new(
        orm: &'a Orm,
        class: &'a EntityClass,
        state: &'a Value,
        record: &'a Record,
    ) -> Self {
        Self {
            orm,
            class,
            state,
            record,
            fields: class.project(record),
        }
    }

    /// Declared name of the entity this holder was built for.
    pub fn entity_name(&self) -> &'a str {
        self.class.name()
    }

    pub fn class(&self) -> &'a EntityClass {
        self.class
    }

    /// Value of the entity's id attribute, if the record carries one.
    pub fn id(&self) -> Option<&'a Value> {
        self.record.get(self.class.id_attribute())
    }

    pub fn state(&self) -> &'a Value {
        self.state
    }

    /// Raw record as stored; association attributes keep their raw names.
    pub fn attributes(&self) -> &'a Record {
        self.record
    }

    pub fn fields(&self) -> &HolderFields {
        &self.fields
    }

    /// Projected field by name, e.g. `title`, `authorId`, `tagsIds`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Traverses association `name`.
    ///
    /// Returns `None` when `name` is not a traversable association.
    pub fn related(&self, name: &str) -> Option<Related<'a>> {
        let raw = self.record.get(name);
        match self.class.associations().get(name)? {
            Association::Single { target } => Some(Related::One(self.select_one(target, raw))),
            Association::Collection { table, .. } => {
                Some(Related::Many(self.select_collection(table, raw)))
            }
            Association::Union(union) => Some(Related::One(self.select_union(union, raw))),
            Association::Opaque { .. } => None,
        }
    }

    pub fn related_one(&self, name: &str) -> Option<EntityHolder<'a>> {
        match self.related(name)? {
            Related::One(holder) => holder,
            Related::Many(_) => None,
        }
    }

    pub fn related_many(&self, name: &str) -> Vec<EntityHolder<'a>> {
        match self.related(name) {
            Some(Related::Many(holders)) => holders,
            Some(Related::One(Some(holder))) => vec![holder],
            Some(Related::One(None)) | None => Vec::new(),
        }
    }

    /// Invokes an extension method attached to this entity.
    pub fn call(&self, method: &str) -> Option<Value> {
        let method = self.class.extension()?.method(method)?;
        Some(method(self))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.to_map())
    }

    /// Projected fields plus traversed associations expanded `depth` levels.
    ///
    /// Expanded associations appear under their base attribute name, beside
    /// the `Id`/`Ids` fields. Only attributes present on the record expand.
    pub fn denormalize(&self, depth: usize) -> Value {
        let mut out = self.fields.to_map();
        if depth == 0 {
            return Value::Object(out);
        }

        for (attribute, _) in self.class.associations().traversable() {
            if !self.record.contains_key(attribute) {
                continue;
            }
            let expanded = match self.related(attribute) {
                Some(Related::One(Some(holder))) => holder.denormalize(depth - 1),
                Some(Related::Many(holders)) => Value::Array(
                    holders
                        .iter()
                        .map(|holder| holder.denormalize(depth - 1))
                        .collect(),
                ),
                Some(Related::One(None)) | None => Value::Null,
            };
            out.insert(attribute.to_string(), expanded);
        }
        Value::Object(out)
    }

    fn select_one(&self, target: &str, raw: Option<&Value>) -> Option<EntityHolder<'a>> {
        let id = raw.filter(|value| !value.is_null())?;
        self.orm.selectors().by_entity(target)?.select(self.state, id)
    }

    fn select_collection(&self, table: &str, raw: Option<&Value>) -> Vec<EntityHolder<'a>> {
        let Some(selector) = self.orm.selectors().by_table(table) else {
            return Vec::new();
        };
        let ids = match raw {
            None | Some(Value::Null) => None,
            Some(Value::Array(ids)) => Some(ids.as_slice()),
            Some(other) => Some(std::slice::from_ref(other)),
        };
        selector.select_many(self.state, ids, true)
    }

    fn select_union(&self, union: &UnionTarget, raw: Option<&Value>) -> Option<EntityHolder<'a>> {
        let raw = raw.filter(|value| !value.is_null())?;
        if let Some((tag, id)) = embedded_reference(raw) {
            let target = match union.entity_for_tag(tag) {
                Some(target) => target,
                None => self.orm.entity_for_name_or_table(tag)?,
            };
            return self.select_one(target, Some(id));
        }
        let target = union.fallback.as_deref()?;
        self.select_one(target, Some(raw))
    }
}

fn embedded_reference(raw: &Value) -> Option<(&str, &Value)> {
    let object = raw.as_object()?;
    let tag = object.get(UNION_SCHEMA_FIELD)?.as_str()?;
    let id = object.get(UNION_ID_FIELD)?;
    Some((tag, id))
}

impl Debug for EntityHolder<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityHolder")
            .field("entity", &self.class.name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Serialize for EntityHolder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}
