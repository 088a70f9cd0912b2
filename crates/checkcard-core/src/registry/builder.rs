//! Builder for creating and checking step registries.

use std::collections::{HashMap, HashSet};

use super::{StepDefinition, StepRegistry};
use crate::error::{CheckcardError, Result};

/// Collects step definitions and checks them as a whole before producing a
/// [`StepRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    steps: Vec<(String, StepDefinition)>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Creates a builder pre-loaded with the standard workflow, ready to be
    /// extended with further steps.
    pub fn speckit() -> Self {
        super::defaults::speckit_builder()
    }

    /// Registers a step. Registration order is kept for navigation.
    pub fn step(mut self, step_id: impl Into<String>, definition: StepDefinition) -> Self {
        self.steps.push((step_id.into(), definition));
        self
    }

    /// Checks the definitions and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::InvalidDefinition` for an empty or duplicate
    /// step id, a source step that is not registered, a step sourcing
    /// itself, a cycle of source steps, or a task-list field that is not a
    /// declared output.
    pub fn build(self) -> Result<StepRegistry> {
        let mut index = HashMap::with_capacity(self.steps.len());
        for (position, (step_id, _)) in self.steps.iter().enumerate() {
            if step_id.trim().is_empty() {
                return Err(CheckcardError::invalid_definition(step_id)
                    .with_reason("Step id cannot be empty"));
            }
            if index.insert(step_id.clone(), position).is_some() {
                return Err(CheckcardError::invalid_definition(step_id)
                    .with_reason("Step id is registered more than once"));
            }
        }

        for (step_id, definition) in &self.steps {
            if let Some(input) = &definition.input {
                if input.source_step == *step_id {
                    return Err(CheckcardError::invalid_definition(step_id)
                        .with_reason("A step cannot take its inputs from itself"));
                }
                if !index.contains_key(&input.source_step) {
                    return Err(CheckcardError::invalid_definition(step_id).with_reason(
                        format!("Source step '{}' is not registered", input.source_step),
                    ));
                }
            }

            if let Some(field) = definition.behavior.task_list_field() {
                if definition.output_field(field).is_none() {
                    return Err(CheckcardError::invalid_definition(step_id).with_reason(
                        format!("Task list field '{field}' is not a declared output"),
                    ));
                }
            }
        }

        Self::check_acyclic(&self.steps, &index)?;

        log::debug!("Built step registry with {} steps", self.steps.len());
        Ok(StepRegistry::from_parts(self.steps, index))
    }

    /// Indexes the steps without checking them. Later duplicates win.
    pub(super) fn into_unchecked(self) -> StepRegistry {
        let index = self
            .steps
            .iter()
            .enumerate()
            .map(|(position, (step_id, _))| (step_id.clone(), position))
            .collect();
        StepRegistry::from_parts(self.steps, index)
    }

    /// Each step has at most one source, so following the source chain from
    /// every step either terminates or revisits a step already on the chain.
    fn check_acyclic(
        steps: &[(String, StepDefinition)],
        index: &HashMap<String, usize>,
    ) -> Result<()> {
        let mut settled: HashSet<usize> = HashSet::new();

        for start in 0..steps.len() {
            let mut chain = Vec::new();
            let mut on_chain = HashSet::new();
            let mut current = Some(start);

            while let Some(position) = current {
                if settled.contains(&position) {
                    break;
                }
                if !on_chain.insert(position) {
                    let cycle_start = chain.iter().position(|p| *p == position).unwrap_or(0);
                    let mut cycle: Vec<&str> = chain[cycle_start..]
                        .iter()
                        .map(|p: &usize| steps[*p].0.as_str())
                        .collect();
                    cycle.push(steps[position].0.as_str());
                    return Err(CheckcardError::invalid_definition(&steps[position].0)
                        .with_reason(format!("Cycle detected: {}", cycle.join(" -> "))));
                }
                chain.push(position);
                current = steps[position]
                    .1
                    .input
                    .as_ref()
                    .and_then(|input| index.get(&input.source_step).copied());
            }

            settled.extend(chain);
        }

        Ok(())
    }
}
