//! Schema registration pass and identity index.
//!
//! # Responsibility
//! - Register entities and top-level unions with validated names and keys.
//! - Build the reverse index used to resolve association targets.
//!
//! # Invariants
//! - Entity names, union names and table keys are unique within one schema.
//! - Every `EntityRef` handed out maps to exactly one registered entity.
//! - A built `Schema` is immutable.

use crate::schema::node::{EntityRef, SchemaNode, UnionSchema};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static SCHEMA_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid schema name regex"));

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// Declared entity: table key plus association map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: String,
    /// Storage key, i.e. the table name inside the normalized store.
    pub key: String,
    /// Explicit id attribute; generator options supply the fallback.
    pub id_attribute: Option<String>,
    pub associations: BTreeMap<String, SchemaNode>,
}

/// Named polymorphic base registered at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDefinition {
    pub name: String,
    pub schema: UnionSchema,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidName(String),
    EmptyTableKey(String),
    DuplicateName(String),
    DuplicateTableKey { key: String, entity: String },
    EmptyAttribute(String),
    ForeignEntityRef(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "schema name is invalid: `{value}`"),
            Self::EmptyTableKey(entity) => {
                write!(f, "entity `{entity}` must declare a non-empty table key")
            }
            Self::DuplicateName(value) => write!(f, "schema name already registered: `{value}`"),
            Self::DuplicateTableKey { key, entity } => {
                write!(f, "table key `{key}` already used by entity `{entity}`")
            }
            Self::EmptyAttribute(entity) => {
                write!(f, "entity `{entity}` declares an empty association attribute")
            }
            Self::ForeignEntityRef(context) => {
                write!(f, "entity handle does not belong to this schema: {context}")
            }
        }
    }
}

impl Error for SchemaError {}

/// Mutable registration pass producing an immutable `Schema`.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema_id: u64,
    entities: Vec<EntityDescriptor>,
    unions: Vec<UnionDefinition>,
    by_name: BTreeMap<String, usize>,
    by_key: BTreeMap<String, usize>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema_id: NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed),
            entities: Vec::new(),
            unions: Vec::new(),
            by_name: BTreeMap::new(),
            by_key: BTreeMap::new(),
        }
    }

    /// Registers one entity stored under table `key`.
    pub fn entity(
        &mut self,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<EntityRef, SchemaError> {
        let name = name.into().trim().to_string();
        let key = key.into().trim().to_string();
        self.check_name(&name)?;
        if key.is_empty() {
            return Err(SchemaError::EmptyTableKey(name));
        }
        if let Some(&slot) = self.by_key.get(&key) {
            return Err(SchemaError::DuplicateTableKey {
                key,
                entity: self.entities[slot].name.clone(),
            });
        }

        let slot = self.entities.len();
        self.by_name.insert(name.clone(), slot);
        self.by_key.insert(key.clone(), slot);
        self.entities.push(EntityDescriptor {
            name,
            key,
            id_attribute: None,
            associations: BTreeMap::new(),
        });
        Ok(EntityRef {
            schema_id: self.schema_id,
            slot,
        })
    }

    /// Overrides the id attribute of one registered entity.
    pub fn id_attribute(
        &mut self,
        entity: EntityRef,
        attribute: impl Into<String>,
    ) -> Result<(), SchemaError> {
        let attribute = attribute.into().trim().to_string();
        let slot = self.own_slot(entity, "id attribute")?;
        if attribute.is_empty() {
            return Err(SchemaError::EmptyAttribute(self.entities[slot].name.clone()));
        }
        self.entities[slot].id_attribute = Some(attribute);
        Ok(())
    }

    /// Declares association `attribute` on `owner` with shape `node`.
    ///
    /// `node` may reference handles from other builders; those stay
    /// unresolved and surface as opaque associations.
    pub fn associate(
        &mut self,
        owner: EntityRef,
        attribute: impl Into<String>,
        node: SchemaNode,
    ) -> Result<(), SchemaError> {
        let attribute = attribute.into().trim().to_string();
        let slot = self.own_slot(owner, &attribute)?;
        if attribute.is_empty() {
            return Err(SchemaError::EmptyAttribute(self.entities[slot].name.clone()));
        }
        self.entities[slot].associations.insert(attribute, node);
        Ok(())
    }

    /// Registers a named top-level union used as a polymorphic prop type.
    pub fn union(
        &mut self,
        name: impl Into<String>,
        schema: UnionSchema,
    ) -> Result<(), SchemaError> {
        let name = name.into().trim().to_string();
        self.check_name(&name)?;
        self.unions.push(UnionDefinition { name, schema });
        Ok(())
    }

    pub fn build(self) -> Schema {
        info!(
            "event=schema_built module=schema status=ok entities={} unions={}",
            self.entities.len(),
            self.unions.len()
        );
        Schema {
            schema_id: self.schema_id,
            entities: self.entities,
            unions: self.unions,
            by_name: self.by_name,
            by_key: self.by_key,
        }
    }

    fn check_name(&self, name: &str) -> Result<(), SchemaError> {
        if !SCHEMA_NAME_RE.is_match(name) {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        if self.by_name.contains_key(name) || self.unions.iter().any(|union| union.name == name) {
            return Err(SchemaError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn own_slot(&self, entity: EntityRef, context: &str) -> Result<usize, SchemaError> {
        if entity.schema_id != self.schema_id || entity.slot >= self.entities.len() {
            return Err(SchemaError::ForeignEntityRef(context.to_string()));
        }
        Ok(entity.slot)
    }
}

/// Immutable registered schema with its identity index.
#[derive(Debug, Clone)]
pub struct Schema {
    schema_id: u64,
    entities: Vec<EntityDescriptor>,
    unions: Vec<UnionDefinition>,
    by_name: BTreeMap<String, usize>,
    by_key: BTreeMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    pub fn unions(&self) -> impl Iterator<Item = &UnionDefinition> {
        self.unions.iter()
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.by_name.get(name).map(|&slot| &self.entities[slot])
    }

    /// Reverse identity lookup: handle -> descriptor.
    pub fn descriptor_of(&self, entity: EntityRef) -> Option<&EntityDescriptor> {
        if entity.schema_id != self.schema_id {
            return None;
        }
        self.entities.get(entity.slot)
    }

    /// Reverse identity lookup: handle -> entity name.
    pub fn entity_name_of(&self, entity: EntityRef) -> Option<&str> {
        self.descriptor_of(entity)
            .map(|descriptor| descriptor.name.as_str())
    }

    /// Table key -> owning entity name.
    pub fn entity_name_for_key(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|&slot| self.entities[slot].name.as_str())
    }

    /// Returns the handle of a registered entity by name.
    pub fn entity_ref(&self, name: &str) -> Option<EntityRef> {
        self.by_name.get(name).map(|&slot| EntityRef {
            schema_id: self.schema_id,
            slot,
        })
    }
}
