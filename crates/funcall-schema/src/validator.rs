//! Definition-time checks on raw schema definitions.

use serde_json::{json, Map, Value};

use crate::error::ValidationError;
use crate::kind::ParameterKind;

const REQUIRED_DEFINITION_FIELDS: [&str; 3] = ["name", "description", "parameters"];

/// Check that a raw function definition is well-formed before compiling it.
///
/// The raw `required` list is not cross-checked against parameter names.
pub fn validate_function_definition(definition: &Value) -> Result<(), ValidationError> {
    let object = definition
        .as_object()
        .ok_or(ValidationError::DefinitionNotObject)?;

    for field in REQUIRED_DEFINITION_FIELDS {
        if !object.contains_key(field) {
            return Err(ValidationError::MissingDefinitionField(field));
        }
    }

    let parameters = object["parameters"]
        .as_object()
        .ok_or(ValidationError::ParametersNotObject)?;

    for (name, parameter) in parameters {
        let kind = match parameter.get("type") {
            Some(kind) => kind,
            None => return Err(ValidationError::MissingParameterKind(name.clone())),
        };
        if parameter.get("description").is_none() {
            return Err(ValidationError::MissingParameterDescription(name.clone()));
        }
        if kind.as_str().and_then(ParameterKind::parse).is_none() {
            return Err(ValidationError::InvalidParameterKind {
                name: name.clone(),
                found: kind.to_string(),
            });
        }
    }
    Ok(())
}

/// Infer a raw parameter-definition map from example argument values.
///
/// No constraints are inferred; descriptions use a fixed template.
pub fn schema_from_parameters(
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    let mut schema = Map::new();
    for (name, example) in params {
        let kind =
            infer_kind(example).ok_or_else(|| ValidationError::UnsupportedExample(name.clone()))?;
        schema.insert(
            name.clone(),
            json!({
                "type": kind.as_str(),
                "description": format!("Parameter: {name}"),
            }),
        );
    }
    Ok(schema)
}

fn infer_kind(example: &Value) -> Option<ParameterKind> {
    match example {
        Value::String(_) => Some(ParameterKind::String),
        Value::Bool(_) => Some(ParameterKind::Boolean),
        Value::Number(_) => Some(ParameterKind::Number),
        Value::Array(_) => Some(ParameterKind::Array),
        Value::Object(_) => Some(ParameterKind::Object),
        Value::Null => None,
    }
}
