//! JSON schema description loading.
//!
//! # Responsibility
//! - Deserialize a declarative schema description from JSON text or files.
//! - Register every entity before converting associations, so references by
//!   name resolve regardless of declaration order.
//!
//! # Invariants
//! - Unknown entity names and unknown JSON shapes never fail loading; they
//!   become `SchemaNode::Unrecognized` and resolve as opaque.
//! - Registration errors (names, keys) do fail loading.

use crate::schema::definition::{Schema, SchemaBuilder, SchemaError};
use crate::schema::node::{EntityRef, SchemaNode, UnionSchema};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Top-level schema description document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDescription {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDescription>,
    #[serde(default)]
    pub unions: BTreeMap<String, UnionDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityDescription {
    pub key: String,
    #[serde(default)]
    pub id_attribute: Option<String>,
    #[serde(default)]
    pub schema: BTreeMap<String, NodeDescription>,
}

/// One association node as written in JSON.
///
/// Variant order matters: serde tries them top to bottom.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeDescription {
    Reference(String),
    Array(Vec<NodeDescription>),
    Union(UnionDescription),
    Object(ObjectDescription),
    Values(ValuesDescription),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnionDescription {
    pub union: BTreeMap<String, NodeDescription>,
    pub schema_attribute: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDescription {
    pub object: BTreeMap<String, NodeDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuesDescription {
    pub values: Box<NodeDescription>,
}

/// Errors raised while loading a description.
#[derive(Debug)]
pub enum DescriptionError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Schema(SchemaError),
}

impl Display for DescriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read schema `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid schema description: {err}"),
            Self::Schema(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DescriptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Schema(err) => Some(err),
        }
    }
}

impl From<SchemaError> for DescriptionError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<serde_json::Error> for DescriptionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl SchemaDescription {
    pub fn from_json_str(value: &str) -> Result<Self, DescriptionError> {
        Ok(serde_json::from_str(value)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DescriptionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Registers the described entities and unions into a `Schema`.
    pub fn into_schema(self) -> Result<Schema, DescriptionError> {
        let mut builder = SchemaBuilder::new();
        let mut refs = BTreeMap::<String, EntityRef>::new();

        for (name, entity) in &self.entities {
            let entity_ref = builder.entity(name.as_str(), entity.key.as_str())?;
            if let Some(id_attribute) = &entity.id_attribute {
                builder.id_attribute(entity_ref, id_attribute.as_str())?;
            }
            refs.insert(name.trim().to_string(), entity_ref);
        }

        for (name, entity) in self.entities {
            let Some(&owner) = refs.get(name.trim()) else {
                continue;
            };
            for (attribute, node) in entity.schema {
                builder.associate(owner, attribute, convert_node(&refs, node))?;
            }
        }

        for (name, union) in self.unions {
            builder.union(name, convert_union(&refs, union))?;
        }

        Ok(builder.build())
    }
}

/// Loads and registers a schema description file in one step.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, DescriptionError> {
    SchemaDescription::from_path(path)?.into_schema()
}

fn convert_node(refs: &BTreeMap<String, EntityRef>, node: NodeDescription) -> SchemaNode {
    match node {
        NodeDescription::Reference(name) => match refs.get(name.trim()) {
            Some(entity) => SchemaNode::Entity(*entity),
            None => SchemaNode::Unrecognized(format!("unknown entity `{name}`")),
        },
        NodeDescription::Array(elements) => SchemaNode::Array(
            elements
                .into_iter()
                .map(|element| convert_node(refs, element))
                .collect(),
        ),
        NodeDescription::Union(union) => SchemaNode::Union(convert_union(refs, union)),
        NodeDescription::Object(object) => SchemaNode::Object(
            object
                .object
                .into_iter()
                .map(|(key, node)| (key, convert_node(refs, node)))
                .collect(),
        ),
        NodeDescription::Values(values) => {
            SchemaNode::Values(Box::new(convert_node(refs, *values.values)))
        }
        NodeDescription::Other(value) => {
            SchemaNode::Unrecognized(format!("unsupported shape `{}`", json_shape(&value)))
        }
    }
}

fn convert_union(refs: &BTreeMap<String, EntityRef>, union: UnionDescription) -> UnionSchema {
    UnionSchema {
        members: union
            .union
            .into_iter()
            .map(|(tag, node)| (tag, convert_node(refs, node)))
            .collect(),
        schema_attribute: union.schema_attribute,
    }
}

fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
