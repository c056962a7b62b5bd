//! Per-entity classes and the attribute projection.
//!
//! # Responsibility
//! - Bundle one entity's table, id attribute, resolved associations and
//!   optional extension.
//! - Project raw records into explicit holder fields.
//!
//! # Invariants
//! - Projection is pure: same associations and record, same fields.
//! - Only attributes present on the record are projected.
//! - Opaque associations are copied verbatim under their own name.

use crate::entity::extension::EntityExtension;
use crate::schema::definition::EntityDescriptor;
use crate::schema::resolve::{Association, ResolvedAssociations};
use crate::store::Record;
use serde_json::{Map, Value};

/// Projected holder fields, split by origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolderFields {
    /// Plain attributes and opaque associations, verbatim.
    pub attributes: Map<String, Value>,
    /// `<name>Id` fields of single and union associations.
    pub ids: Map<String, Value>,
    /// `<name>Ids` fields of collection associations.
    pub id_lists: Map<String, Value>,
}

impl HolderFields {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes
            .get(field)
            .or_else(|| self.ids.get(field))
            .or_else(|| self.id_lists.get(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes
            .iter()
            .chain(self.ids.iter())
            .chain(self.id_lists.iter())
    }

    pub fn len(&self) -> usize {
        self.attributes.len() + self.ids.len() + self.id_lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

/// Renames association attributes of `record` per their resolved variant.
pub fn project_attributes(associations: &ResolvedAssociations, record: &Record) -> HolderFields {
    let mut fields = HolderFields::default();
    for (attribute, value) in record {
        match associations.get(attribute) {
            Some(association @ (Association::Single { .. } | Association::Union(_))) => {
                fields
                    .ids
                    .insert(association.field_name(attribute), value.clone());
            }
            Some(association @ Association::Collection { .. }) => {
                fields
                    .id_lists
                    .insert(association.field_name(attribute), value.clone());
            }
            Some(Association::Opaque { .. }) | None => {
                fields.attributes.insert(attribute.clone(), value.clone());
            }
        }
    }
    fields
}

/// Generated class of one entity.
#[derive(Debug, Clone)]
pub struct EntityClass {
    name: String,
    table: String,
    id_attribute: String,
    associations: ResolvedAssociations,
    extension: Option<EntityExtension>,
}

impl EntityClass {
    pub fn new(
        descriptor: &EntityDescriptor,
        associations: ResolvedAssociations,
        extension: Option<EntityExtension>,
        default_id_attribute: &str,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            table: descriptor.key.clone(),
            id_attribute: descriptor
                .id_attribute
                .clone()
                .unwrap_or_else(|| default_id_attribute.to_string()),
            associations,
            extension,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn associations(&self) -> &ResolvedAssociations {
        &self.associations
    }

    pub fn extension(&self) -> Option<&EntityExtension> {
        self.extension.as_ref()
    }

    pub fn project(&self, record: &Record) -> HolderFields {
        project_attributes(&self.associations, record)
    }
}
