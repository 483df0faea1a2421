use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::parameter::{ParameterSchema, ParameterSpec};

/// Raw, wire-shaped definition of a callable function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: IndexMap<String, ParameterSpec>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// Validation schema for one registered function.
///
/// `required` names parameters that must be present in every call. It is
/// not cross-checked against `parameters`, and it is independent of the
/// per-parameter `required` flag used by nested schemas.
#[derive(Debug, Clone)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: IndexMap<String, ParameterSchema>,
    pub required: Vec<String>,
}

impl FunctionSchema {
    /// Compile a raw spec, eagerly building every parameter schema.
    pub fn from_spec(spec: FunctionSpec) -> Result<Self, ValidationError> {
        let mut parameters = IndexMap::with_capacity(spec.parameters.len());
        for (name, parameter_spec) in spec.parameters {
            let schema =
                ParameterSchema::from_spec(parameter_spec).map_err(|source| {
                    ValidationError::Parameter {
                        name: name.clone(),
                        source: Box::new(source),
                    }
                })?;
            parameters.insert(name, schema);
        }
        Ok(Self {
            name: spec.name,
            description: spec.description,
            parameters,
            required: spec.required,
        })
    }

    /// Compile directly from a raw JSON definition.
    pub fn from_definition(definition: &Value) -> Result<Self, ValidationError> {
        let spec: FunctionSpec = serde_json::from_value(definition.clone())
            .map_err(|err| ValidationError::MalformedDefinition(err.to_string()))?;
        Self::from_spec(spec)
    }

    /// Validate a full argument map against this schema.
    ///
    /// Checks run in a fixed order: required names first, then unknown
    /// keys, then per-value validation, each in insertion order.
    pub fn validate_parameters(&self, params: &Map<String, Value>) -> Result<(), ValidationError> {
        for name in &self.required {
            if !params.contains_key(name) {
                return Err(ValidationError::RequiredParameterMissing(name.clone()));
            }
        }

        for (name, value) in params {
            let schema = self
                .parameters
                .get(name)
                .ok_or_else(|| ValidationError::UnknownParameter(name.clone()))?;
            schema
                .validate(value)
                .map_err(|source| ValidationError::Parameter {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
