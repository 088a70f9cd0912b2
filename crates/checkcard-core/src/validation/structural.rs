//! Structural rules derived from a step definition.

use serde_json::Value;

use super::{display_value, json_kind, ValidationReport};
use crate::{
    models::{CheckcardRecord, LifecycleStatus},
    registry::{Expected, NestedRequirement, RequiredValue, StepDefinition, ValueKind},
    resolver::lookup,
};

/// Checks a record against the shape its step definition requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, record: &CheckcardRecord, definition: &StepDefinition) -> ValidationReport {
        let mut report = ValidationReport::new();
        let document = match record.to_value() {
            Ok(document) => document,
            Err(err) => {
                report.error(err.to_string());
                return report;
            }
        };

        if record.lifecycle_status() == Some(LifecycleStatus::Completed) {
            Self::check_outputs_present(record, definition, &mut report);
        }
        Self::check_inputs_present(record, definition, &mut report);

        for rule in &definition.rules.required_values {
            Self::check_required_value(&document, rule, &mut report);
        }
        for rule in &definition.rules.required_nested {
            Self::check_nested(&document, rule, &mut report);
        }

        Self::check_output_types(record, definition, &mut report);
        report
    }

    fn check_outputs_present(
        record: &CheckcardRecord,
        definition: &StepDefinition,
        report: &mut ValidationReport,
    ) {
        for key in definition.output_keys() {
            match record.data.outputs.get(key) {
                None => report.error(format!("Missing required output field: outputs.{key}")),
                Some(Value::Null) => {
                    report.error(format!("Completed checkcard has null output: outputs.{key}"))
                }
                Some(_) => {}
            }
        }
    }

    fn check_inputs_present(
        record: &CheckcardRecord,
        definition: &StepDefinition,
        report: &mut ValidationReport,
    ) {
        let Some(spec) = &definition.input else {
            return;
        };
        for key in spec.keys() {
            let present = record
                .data
                .inputs
                .as_ref()
                .is_some_and(|inputs| inputs.contains_key(key));
            if !present {
                report.error(format!("Missing required input field: inputs.{key}"));
            }
        }
    }

    fn check_required_value(document: &Value, rule: &RequiredValue, report: &mut ValidationReport) {
        let null = Value::Null;
        let actual = match lookup(document, &rule.path) {
            None | Some(Value::Null) if rule.allow_absent => return,
            None => &null,
            Some(value) => value,
        };

        if rule.expected.matches(actual) {
            return;
        }

        let expected = match &rule.expected {
            Expected::Literal(value) => format!("Expected: {}", display_value(value)),
            Expected::OneOf(options) => format!(
                "Expected one of: [{}]",
                options
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        report.error(format!(
            "Field '{}' has invalid value '{}'. {expected}",
            rule.path,
            display_value(actual)
        ));
    }

    fn check_nested(document: &Value, rule: &NestedRequirement, report: &mut ValidationReport) {
        let path = &rule.path;
        let nested = match lookup(document, path) {
            None | Some(Value::Null) if rule.optional => return,
            None => {
                report.error(format!("Missing required nested structure: {path}"));
                return;
            }
            Some(Value::Object(nested)) => nested,
            Some(_) => {
                report.error(format!("Field '{path}' must be an object"));
                return;
            }
        };

        for (key, kind) in &rule.fields {
            let Some(value) = nested.get(key) else {
                report.error(format!("Missing required field in '{path}': {key}"));
                continue;
            };
            if kind.matches(value) {
                continue;
            }
            let message = match kind {
                ValueKind::Object => format!("Field '{path}.{key}' must be an object"),
                ValueKind::List => format!("Field '{path}.{key}' must be an array"),
                other => format!(
                    "Field '{path}.{key}' has wrong type. Expected {}",
                    other.as_str()
                ),
            };
            report.error(message);
        }
    }

    fn check_output_types(
        record: &CheckcardRecord,
        definition: &StepDefinition,
        report: &mut ValidationReport,
    ) {
        for field in &definition.outputs {
            let Some(value) = record.data.outputs.get(&field.key) else {
                continue;
            };
            if value.is_null() || field.kind.accepts(value) {
                continue;
            }
            report.error(format!(
                "Field 'outputs.{}': expected {}, got {}",
                field.key,
                field.kind.expected_kind(),
                json_kind(value)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::{
        models::{DataSection, StepMetadata},
        registry::StepRegistry,
    };

    fn metadata(step_id: &str, agent: &str) -> StepMetadata {
        StepMetadata {
            step_id: step_id.to_string(),
            step_index: 1,
            step_name: "Test".to_string(),
            agent: agent.to_string(),
            description: String::new(),
            created_at: None,
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn validate(step_id: &str, record: &CheckcardRecord) -> ValidationReport {
        let registry = StepRegistry::speckit();
        StructuralValidator::new().validate(record, registry.definition(step_id).unwrap())
    }

    fn clarify_record(outputs: Value) -> CheckcardRecord {
        CheckcardRecord::new(
            metadata("C1", "orchestrator"),
            DataSection {
                inputs: Some(object(json!({"spec_file_path": "spec.md"}))),
                outputs: object(outputs),
                tools: None,
            },
        )
    }

    #[test]
    fn test_complete_record_passes() {
        let record = clarify_record(json!({
            "user_approved_clarification": true,
            "clarify_summary": "done",
            "spec_file_path": "spec.md"
        }))
        .with_status(LifecycleStatus::Completed);

        let report = validate("C1", &record);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_completed_record_reports_missing_and_null_outputs() {
        let record = clarify_record(json!({
            "user_approved_clarification": true,
            "clarify_summary": null
        }))
        .with_status(LifecycleStatus::Completed);

        let report = validate("C1", &record);
        assert_eq!(
            report.errors,
            vec![
                "Completed checkcard has null output: outputs.clarify_summary",
                "Missing required output field: outputs.spec_file_path",
            ]
        );
    }

    #[test]
    fn test_outputs_not_required_before_completion() {
        let record = clarify_record(json!({})).with_status(LifecycleStatus::InProgress);
        assert!(validate("C1", &record).is_valid());
    }

    #[test]
    fn test_inputs_required_regardless_of_status() {
        let mut record = clarify_record(json!({}));
        record.data.inputs = None;

        let report = validate("C1", &record);
        assert_eq!(
            report.errors,
            vec!["Missing required input field: inputs.spec_file_path"]
        );
    }

    #[test]
    fn test_required_values() {
        let mut record = clarify_record(json!({}));
        record.metadata.agent = "planner".to_string();
        record.status = Some(json!("finished"));

        let report = validate("C1", &record);
        assert_eq!(
            report.errors,
            vec![
                "Field 'metadata.agent' has invalid value 'planner'. Expected: orchestrator",
                "Field 'status' has invalid value 'finished'. Expected one of: [pending, in_progress, completed, failed]",
            ]
        );
    }

    #[test]
    fn test_output_types_are_checked() {
        let record = clarify_record(json!({
            "user_approved_clarification": "yes",
            "clarify_summary": "fine"
        }));

        let report = validate("C1", &record);
        assert_eq!(
            report.errors,
            vec!["Field 'outputs.user_approved_clarification': expected boolean, got string"]
        );
    }

    #[test]
    fn test_nested_tools_rule() {
        let mut record = CheckcardRecord::new(metadata("A1", "orchestrator"), DataSection::default());
        assert!(validate("A1", &record).is_valid());

        record.data.tools = Some(object(json!({
            "file_context_accessed": ["src/lib.rs"],
            "mcp_servers_accessed": "context7"
        })));
        let report = validate("A1", &record);
        assert_eq!(
            report.errors,
            vec![
                "Field 'data.tools.mcp_servers_accessed' must be an array",
                "Missing required field in 'data.tools': claude_skills_accessed",
            ]
        );
    }

    #[test]
    fn test_required_nested_structure_missing() {
        let rule = NestedRequirement::new("data.outputs.loops").field("iterations", ValueKind::Integer);
        let mut report = ValidationReport::new();

        StructuralValidator::check_nested(&json!({"data": {"outputs": {}}}), &rule, &mut report);
        StructuralValidator::check_nested(
            &json!({"data": {"outputs": {"loops": {"iterations": "two"}}}}),
            &rule,
            &mut report,
        );

        assert_eq!(
            report.errors,
            vec![
                "Missing required nested structure: data.outputs.loops",
                "Field 'data.outputs.loops.iterations' has wrong type. Expected integer",
            ]
        );
    }
}
