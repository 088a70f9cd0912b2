//! Step definition registry.
//!
//! The registry is built once, checked as a whole by [`RegistryBuilder`],
//! and then only read. It is passed by reference to every component that
//! needs a step definition.
//!
//! # Examples
//!
//! ```rust
//! use checkcard_core::{models::Actor, registry::StepRegistry};
//!
//! let registry = StepRegistry::speckit();
//! let definition = registry.definition("B1").unwrap();
//! assert_eq!(definition.actor, Actor::Planner);
//! assert!(registry.definition("Z9").is_err());
//! ```

mod builder;
mod defaults;
mod definition;


use std::collections::{BTreeMap, HashMap};

pub use builder::RegistryBuilder;
pub use definition::{
    DefinitionMetadata, Expected, FieldType, InputSpec, NestedRequirement, OutputField,
    RequiredValue, StepBehavior, StepDefinition, StructuralRules, ValueKind,
};

use crate::{
    error::{CheckcardError, Result},
    models::Actor,
};

/// Read-only mapping from step id to definition.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<(String, StepDefinition)>,
    index: HashMap<String, usize>,
}

impl StepRegistry {
    pub(crate) fn from_parts(
        steps: Vec<(String, StepDefinition)>,
        index: HashMap<String, usize>,
    ) -> Self {
        Self { steps, index }
    }

    /// The standard six-step specify/clarify/plan/tasks workflow.
    pub fn speckit() -> Self {
        defaults::speckit_registry()
    }

    /// Looks up a step definition.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::UnknownStep` listing the registered ids.
    pub fn definition(&self, step_id: &str) -> Result<&StepDefinition> {
        self.index
            .get(step_id)
            .map(|position| &self.steps[*position].1)
            .ok_or_else(|| CheckcardError::UnknownStep {
                step_id: step_id.to_string(),
                valid: self.step_ids().map(str::to_string).collect(),
            })
    }

    /// Step ids grouped by owning actor, in registration order.
    pub fn actors(&self) -> BTreeMap<Actor, Vec<String>> {
        let mut actors: BTreeMap<Actor, Vec<String>> = BTreeMap::new();
        for (step_id, definition) in &self.steps {
            actors
                .entry(definition.actor)
                .or_default()
                .push(step_id.clone());
        }
        actors
    }

    /// Registered step ids, in registration order.
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(step_id, _)| step_id.as_str())
    }

    /// Iterates over `(step_id, definition)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepDefinition)> {
        self.steps
            .iter()
            .map(|(step_id, definition)| (step_id.as_str(), definition))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::speckit()
    }
}
