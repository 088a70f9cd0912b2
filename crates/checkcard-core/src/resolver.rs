//! Dotted-path extraction from nested JSON and input resolution.
//!
//! A path such as `outputs.user_story` is split on `.` and walked through
//! nested objects. A missing segment or a non-object intermediate yields the
//! empty-object sentinel rather than an error, and [`is_absent`] treats the
//! sentinel, `null` and empty strings, arrays and objects alike as "not
//! ready".

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::{
    error::{CheckcardError, Result},
    models::CheckcardRecord,
    registry::StepDefinition,
};

/// Walks `path` through nested objects in `value`.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Cow<'a, Value> {
    match lookup(value, path) {
        Some(found) => Cow::Borrowed(found),
        None => Cow::Owned(Value::Object(Map::new())),
    }
}

/// Like [`resolve`], but distinguishes a missing key from a stored value.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Whether a resolved value counts as missing.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Builds a step's inputs from the stored record of its source step.
///
/// Steps without an input spec resolve to an empty map.
///
/// # Errors
///
/// Returns `CheckcardError::MissingInput` for the first mapping whose value
/// is absent.
pub fn resolve_inputs(
    definition: &StepDefinition,
    source: &CheckcardRecord,
) -> Result<Map<String, Value>> {
    let mut inputs = Map::new();
    let Some(spec) = &definition.input else {
        return Ok(inputs);
    };

    let data = serde_json::to_value(&source.data)?;
    for (key, path) in &spec.field_mappings {
        let value = resolve(&data, path);
        if is_absent(&value) {
            return Err(CheckcardError::missing_input(key, &spec.source_step).at_path(path));
        }
        inputs.insert(key.clone(), value.into_owned());
    }

    log::debug!(
        "Resolved {} input(s) from step {}",
        inputs.len(),
        spec.source_step
    );
    Ok(inputs)
}
