//! Schema-driven accessors, selectors and prop validators over a normalized
//! entity store.
//!
//! A `Schema` declares entities, their table keys and their associations.
//! `generate` resolves the association graph once and returns an `Orm`
//! bundle whose selectors read hydrated `EntityHolder`s out of a host state
//! snapshot.

pub mod config;
pub mod entity;
pub mod generator;
pub mod logging;
pub mod schema;
pub mod selector;
pub mod store;
pub mod validator;

pub use config::{ConfigError, GeneratorOptions, DEFAULT_ID_ATTRIBUTE, DEFAULT_STORE_ROOT_KEY};
pub use entity::class::{project_attributes, EntityClass, HolderFields};
pub use entity::extension::{EntityExtension, ExtensionMethod};
pub use entity::holder::{EntityHolder, Related};
pub use generator::{generate, Extensions, Orm};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use schema::annotate::{annotate, annotate_entity, NodeKind};
pub use schema::definition::{EntityDescriptor, Schema, SchemaBuilder, SchemaError};
pub use schema::description::{load_schema, DescriptionError, SchemaDescription};
pub use schema::node::{EntityRef, SchemaNode, UnionSchema};
pub use schema::resolve::{Association, ResolvedAssociations, UnionTarget};
pub use selector::{Selector, Selectors};
pub use store::{id_key, Record, StoreView};
pub use validator::{PropCandidate, PropValidationError, PropValidator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
