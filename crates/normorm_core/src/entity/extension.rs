//! Caller-supplied base behavior for entity holders.

use crate::entity::holder::EntityHolder;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Derived method evaluated against one holder.
pub type ExtensionMethod = Arc<dyn Fn(&EntityHolder<'_>) -> Value + Send + Sync>;

/// Named derived methods attached to every holder of one entity.
#[derive(Clone, Default)]
pub struct EntityExtension {
    methods: BTreeMap<String, ExtensionMethod>,
}

impl EntityExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces method `name`.
    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&EntityHolder<'_>) -> Value + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn method(&self, name: &str) -> Option<&ExtensionMethod> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Debug for EntityExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityExtension")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
