//! Step definition types.

use std::{fmt, str::FromStr};

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Actor, LifecycleStatus};

/// Declared type of an output or tool field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Bool,
    List,
    Json,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Bool => "bool",
            FieldType::List => "list",
            FieldType::Json => "json",
        }
    }

    /// Whether a present, non-null value has this type. `json` accepts
    /// anything.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Text => value.is_string(),
            FieldType::Bool => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Json => true,
        }
    }

    /// Name of the JSON kind a value of this type must have.
    pub fn expected_kind(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Bool => "boolean",
            FieldType::List => "array",
            FieldType::Json => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldType::Text),
            "bool" => Ok(FieldType::Bool),
            "list" => Ok(FieldType::List),
            "json" => Ok(FieldType::Json),
            _ => Err(format!("Invalid field type: {s}")),
        }
    }
}

/// One output (or tool) question of a step.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    pub key: String,
    pub kind: FieldType,
    pub prompt: String,
}

impl OutputField {
    pub fn new(key: impl Into<String>, kind: FieldType, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            prompt: prompt.into(),
        }
    }

    pub fn text(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, FieldType::Text, prompt)
    }

    pub fn boolean(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, FieldType::Bool, prompt)
    }

    pub fn list(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, FieldType::List, prompt)
    }

    pub fn json(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, FieldType::Json, prompt)
    }
}

/// Where a step's inputs come from.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Step whose stored record supplies the values
    pub source_step: String,
    /// Section of the source file holding the record
    pub source_section: String,
    /// Local input key to dotted path inside the source's data section
    pub field_mappings: Vec<(String, String)>,
}

impl InputSpec {
    /// Input spec reading from the default `step<ID>` section.
    pub fn from_step(source_step: impl Into<String>) -> Self {
        let source_step = source_step.into();
        Self {
            source_section: format!("step{source_step}"),
            source_step,
            field_mappings: Vec::new(),
        }
    }

    /// Adds a mapping from a local key to a dotted source path.
    pub fn map(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.field_mappings.push((key.into(), path.into()));
        self
    }

    /// Local input keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.field_mappings.iter().map(|(key, _)| key.as_str())
    }
}

/// How a step's output is checked beyond the common structural rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBehavior {
    Standard,
    /// The named output holds a task list to validate and normalize
    TaskListValidated { field: String },
}

impl StepBehavior {
    /// Output field carrying the task list, if any.
    pub fn task_list_field(&self) -> Option<&str> {
        match self {
            StepBehavior::Standard => None,
            StepBehavior::TaskListValidated { field } => Some(field),
        }
    }
}

/// Accepted value(s) for a required-value rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Literal(Value),
    OneOf(Vec<Value>),
}

impl Expected {
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Expected::Literal(expected) => expected == actual,
            Expected::OneOf(options) => options.contains(actual),
        }
    }
}

/// A dotted path in the record that must hold a specific value.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredValue {
    pub path: String,
    pub expected: Expected,
    /// Absence is not a violation
    pub allow_absent: bool,
}

impl RequiredValue {
    pub fn literal(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            expected: Expected::Literal(value.into()),
            allow_absent: false,
        }
    }

    pub fn one_of(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            path: path.into(),
            expected: Expected::OneOf(values),
            allow_absent: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.allow_absent = true;
        self
    }
}

/// JSON kind required of a nested field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    List,
    String,
    Integer,
    Number,
    Boolean,
}

impl ValueKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Object => value.is_object(),
            ValueKind::List => value.is_array(),
            ValueKind::String => value.is_string(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Object => "object",
            ValueKind::List => "array",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
        }
    }
}

/// An object at a dotted path that must carry typed keys.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedRequirement {
    pub path: String,
    pub fields: Vec<(String, ValueKind)>,
    /// The object itself may be missing
    pub optional: bool,
}

impl NestedRequirement {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: Vec::new(),
            optional: false,
        }
    }

    pub fn field(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.fields.push((key.into(), kind));
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Step-specific structural rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralRules {
    pub required_values: Vec<RequiredValue>,
    pub required_nested: Vec<NestedRequirement>,
}

impl StructuralRules {
    /// Rules every standard step carries: its own id, its actor, and a
    /// recognized status when one is given.
    pub fn standard(step_id: &str, actor: Actor) -> Self {
        Self {
            required_values: vec![
                RequiredValue::literal("metadata.step_id", step_id),
                RequiredValue::literal("metadata.agent", actor.as_str()),
                RequiredValue::one_of(
                    "status",
                    LifecycleStatus::ALL
                        .iter()
                        .map(|status| Value::from(status.as_str()))
                        .collect(),
                )
                .optional(),
            ],
            required_nested: Vec::new(),
        }
    }

    pub fn nested(mut self, requirement: NestedRequirement) -> Self {
        self.required_nested.push(requirement);
        self
    }
}

/// Informational metadata copied into each saved record.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionMetadata {
    pub step_index: u32,
    pub step_name: String,
    pub description: String,
}

/// Immutable description of one workflow step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition {
    pub actor: Actor,
    pub input: Option<InputSpec>,
    pub outputs: Vec<OutputField>,
    pub tools: Vec<OutputField>,
    pub behavior: StepBehavior,
    pub rules: StructuralRules,
    pub metadata: DefinitionMetadata,
    pub instructions: Vec<String>,
}

impl StepDefinition {
    /// Creates a standard step with no inputs, outputs or rules.
    pub fn new(actor: Actor, step_index: u32, step_name: impl Into<String>) -> Self {
        Self {
            actor,
            input: None,
            outputs: Vec::new(),
            tools: Vec::new(),
            behavior: StepBehavior::Standard,
            rules: StructuralRules::default(),
            metadata: DefinitionMetadata {
                step_index,
                step_name: step_name.into(),
                description: String::new(),
            },
            instructions: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    pub fn output(mut self, field: OutputField) -> Self {
        self.outputs.push(field);
        self
    }

    pub fn tool(mut self, field: OutputField) -> Self {
        self.tools.push(field);
        self
    }

    pub fn behavior(mut self, behavior: StepBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn rules(mut self, rules: StructuralRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_field(&self, key: &str) -> Option<&OutputField> {
        self.outputs.iter().find(|field| field.key == key)
    }

    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|field| field.key.as_str())
    }

    pub fn declares_tools(&self) -> bool {
        !self.tools.is_empty()
    }
}
