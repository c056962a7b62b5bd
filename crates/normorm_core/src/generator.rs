//! One-shot generation of classes, selectors and validators.
//!
//! # Responsibility
//! - Resolve every entity's associations once and freeze the result.
//! - Hand back one `Orm` bundle owning all generated pieces.
//!
//! # Invariants
//! - Generation never fails on association shape; only invalid options fail.
//! - The bundle is immutable and safe to share across threads.

use crate::config::{ConfigError, GeneratorOptions};
use crate::entity::class::EntityClass;
use crate::entity::extension::EntityExtension;
use crate::entity::holder::EntityHolder;
use crate::schema::definition::Schema;
use crate::schema::resolve::{resolve_entity, resolve_union};
use crate::selector::{Selector, Selectors};
use crate::validator::PropValidator;
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Extension map keyed by entity name.
pub type Extensions = BTreeMap<String, EntityExtension>;

/// Generated classes, selectors and validators for one schema.
#[derive(Debug)]
pub struct Orm {
    options: GeneratorOptions,
    classes: BTreeMap<String, EntityClass>,
    tables: BTreeMap<String, String>,
    validators: BTreeMap<String, PropValidator>,
}

/// Generates the bundle for `schema`.
///
/// Extensions naming unknown entities are ignored with a warning.
pub fn generate(
    schema: &Schema,
    extensions: Extensions,
    options: GeneratorOptions,
) -> Result<Orm, ConfigError> {
    options.validate()?;
    Ok(assemble(schema, extensions, options))
}

fn assemble(schema: &Schema, mut extensions: Extensions, options: GeneratorOptions) -> Orm {
    let mut classes = BTreeMap::new();
    let mut tables = BTreeMap::new();
    let mut validators = BTreeMap::new();

    for descriptor in schema.entities() {
        let associations = resolve_entity(schema, descriptor);
        let extension = extensions.remove(&descriptor.name);
        tables.insert(descriptor.key.clone(), descriptor.name.clone());
        validators.insert(
            descriptor.name.clone(),
            PropValidator::for_entity(descriptor.name.as_str()),
        );
        classes.insert(
            descriptor.name.clone(),
            EntityClass::new(descriptor, associations, extension, &options.id_attribute),
        );
    }

    for union in schema.unions() {
        match resolve_union(schema, &union.name, &union.schema) {
            Some(target) => {
                validators.insert(
                    union.name.clone(),
                    PropValidator::for_union(union.name.as_str(), target),
                );
            }
            None => warn!(
                "event=union_unresolved module=generator status=skip union={}",
                union.name
            ),
        }
    }

    for entity in extensions.keys() {
        warn!(
            "event=extension_ignored module=generator status=skip entity={}",
            entity
        );
    }

    info!(
        "event=orm_generated module=generator status=ok entities={} validators={} root_key={}",
        classes.len(),
        validators.len(),
        options.store_root_key
    );

    Orm {
        options,
        classes,
        tables,
        validators,
    }
}

impl Orm {
    /// Generates with no extensions and default options.
    pub fn from_schema(schema: &Schema) -> Self {
        assemble(schema, Extensions::new(), GeneratorOptions::default())
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn classes(&self) -> &BTreeMap<String, EntityClass> {
        &self.classes
    }

    pub fn class(&self, entity: &str) -> Option<&EntityClass> {
        self.classes.get(entity)
    }

    pub fn selectors(&self) -> Selectors<'_> {
        Selectors::new(self)
    }

    pub fn selector(&self, entity: &str) -> Option<Selector<'_>> {
        self.selectors().by_entity(entity)
    }

    pub fn validators(&self) -> &BTreeMap<String, PropValidator> {
        &self.validators
    }

    pub fn validator(&self, name: &str) -> Option<&PropValidator> {
        self.validators.get(name)
    }

    /// Table key -> entity name.
    pub fn entity_for_table(&self, table: &str) -> Option<&str> {
        self.tables.get(table).map(String::as_str)
    }

    /// Resolves an entity by name, falling back to table key.
    pub fn entity_for_name_or_table(&self, value: &str) -> Option<&str> {
        match self.classes.get_key_value(value) {
            Some((name, _)) => Some(name.as_str()),
            None => self.entity_for_table(value),
        }
    }

    /// Single lookup of `entity` by id.
    pub fn select<'a>(
        &'a self,
        state: &'a Value,
        entity: &str,
        id: &Value,
    ) -> Option<EntityHolder<'a>> {
        self.selector(entity)?.select(state, id)
    }

    /// Collection lookup on `table`.
    pub fn select_table<'a>(
        &'a self,
        state: &'a Value,
        table: &str,
        ids: Option<&[Value]>,
        empty_when_unspecified: bool,
    ) -> Vec<EntityHolder<'a>> {
        match self.selectors().by_table(table) {
            Some(selector) => selector.select_many(state, ids, empty_when_unspecified),
            None => Vec::new(),
        }
    }
}
