//! Prop validators for host UI components.
//!
//! # Responsibility
//! - Check that a supplied prop value is a holder of the expected entity.
//! - Report mismatches as values on the host's own error path.
//!
//! # Invariants
//! - Absent and `null` candidates always pass.
//! - Polymorphic validators derive the expected entity from each candidate's
//!   own tag attribute.

use crate::entity::holder::EntityHolder;
use crate::schema::resolve::UnionTarget;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Value that can be handed to a prop validator.
pub trait PropCandidate {
    /// Entity name reported by the candidate's identity accessor.
    fn reported_entity_name(&self) -> Option<&str>;
    /// Raw attribute lookup, used for polymorphic tag resolution.
    fn raw_attribute(&self, name: &str) -> Option<&Value>;
    /// Absent candidates pass validation; override to opt in (`Value` does for `null`).
    fn is_absent(&self) -> bool {
        false
    }
}

impl PropCandidate for EntityHolder<'_> {
    fn reported_entity_name(&self) -> Option<&str> {
        Some(self.entity_name())
    }

    fn raw_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }
}

impl PropCandidate for Value {
    fn reported_entity_name(&self) -> Option<&str> {
        None
    }

    fn raw_attribute(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn is_absent(&self) -> bool {
        self.is_null()
    }
}

/// Validation failure handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropValidationError {
    pub prop_name: String,
    pub component_name: String,
    pub expected: String,
}

impl Display for PropValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid prop `{}` supplied to `{}`, expected `{}`. Validation failed.",
            self.prop_name, self.component_name, self.expected
        )
    }
}

impl Error for PropValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expectation {
    Entity,
    Union(UnionTarget),
}

/// Generated validator for one entity or polymorphic base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropValidator {
    name: String,
    expectation: Expectation,
}

impl PropValidator {
    pub fn for_entity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectation: Expectation::Entity,
        }
    }

    pub fn for_union(name: impl Into<String>, target: UnionTarget) -> Self {
        Self {
            name: name.into(),
            expectation: Expectation::Union(target),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self.expectation, Expectation::Union(_))
    }

    /// Entity name `candidate` must report to pass.
    ///
    /// For polymorphic validators an untagged or unknown tag falls back to the
    /// validator's own name, which no holder reports.
    pub fn expected_for(&self, candidate: &dyn PropCandidate) -> &str {
        match &self.expectation {
            Expectation::Entity => self.name.as_str(),
            Expectation::Union(target) => candidate
                .raw_attribute(&target.schema_attribute)
                .and_then(Value::as_str)
                .and_then(|tag| target.entity_for_tag(tag))
                .unwrap_or(self.name.as_str()),
        }
    }

    pub fn validate(
        &self,
        candidate: Option<&dyn PropCandidate>,
        prop_name: &str,
        component_name: &str,
    ) -> Result<(), PropValidationError> {
        let Some(candidate) = candidate else {
            return Ok(());
        };
        if candidate.is_absent() {
            return Ok(());
        }

        let expected = self.expected_for(candidate);
        if candidate.reported_entity_name() == Some(expected) {
            return Ok(());
        }
        Err(PropValidationError {
            prop_name: prop_name.to_string(),
            component_name: component_name.to_string(),
            expected: expected.to_string(),
        })
    }
}
