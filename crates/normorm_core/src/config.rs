//! Generator configuration.
//!
//! # Responsibility
//! - Carry the host-facing knobs of one generator call.
//! - Parse and validate JSON configuration supplied by callers or the CLI.
//!
//! # Invariants
//! - `store_root_key` and `id_attribute` are never empty once validated.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Root key under which the host state keeps its normalized tables.
pub const DEFAULT_STORE_ROOT_KEY: &str = "entities";
/// Attribute used as record id when an entity declares none.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Options for one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Key of the table map inside the host state object.
    pub store_root_key: String,
    /// Fallback id attribute for entities without an explicit one.
    pub id_attribute: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            store_root_key: DEFAULT_STORE_ROOT_KEY.to_string(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Builds options with a custom store root key.
    pub fn with_store_root_key(store_root_key: impl Into<String>) -> Self {
        Self {
            store_root_key: store_root_key.into(),
            ..Self::default()
        }
    }

    /// Parses options from JSON text and validates them.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let options: Self =
            serde_json::from_str(value).map_err(|err| ConfigError::Parse(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_root_key.trim().is_empty() {
            return Err(ConfigError::EmptyStoreRootKey);
        }
        if self.id_attribute.trim().is_empty() {
            return Err(ConfigError::EmptyIdAttribute);
        }
        Ok(())
    }
}

/// Configuration parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStoreRootKey,
    EmptyIdAttribute,
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStoreRootKey => write!(f, "store root key must not be empty"),
            Self::EmptyIdAttribute => write!(f, "id attribute must not be empty"),
            Self::Parse(message) => write!(f, "invalid generator options: {message}"),
        }
    }
}

impl Error for ConfigError {}
