//! Association schema nodes.
//!
//! Nodes describe the shape of one association attribute. Entity identity is
//! carried by `EntityRef` handles handed out at registration time, never by
//! comparing descriptor contents.

use std::collections::BTreeMap;

/// Stable handle to an entity registered in one `SchemaBuilder`.
///
/// Handles from a different builder never resolve against this schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    pub(crate) schema_id: u64,
    pub(crate) slot: usize,
}

/// Tagged union of entity schemas keyed by tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSchema {
    /// Tag value -> member node (normally `SchemaNode::Entity`).
    pub members: BTreeMap<String, SchemaNode>,
    /// Record attribute whose value selects the member tag.
    pub schema_attribute: String,
}

impl UnionSchema {
    pub fn new(schema_attribute: impl Into<String>) -> Self {
        Self {
            members: BTreeMap::new(),
            schema_attribute: schema_attribute.into(),
        }
    }

    /// Adds one member entity under `tag`.
    pub fn member(mut self, tag: impl Into<String>, entity: EntityRef) -> Self {
        self.members.insert(tag.into(), SchemaNode::Entity(entity));
        self
    }
}

/// Shape of one association attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Single reference to another entity.
    Entity(EntityRef),
    /// Ordered collection; only a one-element entity array is traversable.
    Array(Vec<SchemaNode>),
    /// Polymorphic reference.
    Union(UnionSchema),
    /// Nested plain object of further nodes. Never traversed.
    Object(BTreeMap<String, SchemaNode>),
    /// Map of arbitrary keys to one node shape. Never traversed.
    Values(Box<SchemaNode>),
    /// Shape that could not be classified; the payload says why.
    Unrecognized(String),
}

impl SchemaNode {
    pub fn entity(entity: EntityRef) -> Self {
        Self::Entity(entity)
    }

    pub fn collection(entity: EntityRef) -> Self {
        Self::Array(vec![Self::Entity(entity)])
    }

    pub fn union(union: UnionSchema) -> Self {
        Self::Union(union)
    }
}
