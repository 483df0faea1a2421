//! Per-parameter validation rules.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::kind::ParameterKind;

/// Raw, wire-shaped definition of a single parameter or nested value.
///
/// Constraint fields are only meaningful for their own kind; the rest are
/// carried but ignored during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, ParameterSpec>>,
}

/// Compiled validation rules for one parameter or one nested value.
///
/// Nested `items`/`properties` schemas are built eagerly when the spec is
/// compiled, so malformed nested definitions surface at registration.
#[derive(Debug, Clone)]
pub struct ParameterSchema {
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pattern: Option<Regex>,
    pub enum_values: Option<Vec<Value>>,
    pub items: Option<Box<ParameterSchema>>,
    pub properties: Option<IndexMap<String, ParameterSchema>>,
}

impl ParameterSchema {
    /// Compile a raw spec into a reusable schema.
    pub fn from_spec(spec: ParameterSpec) -> Result<Self, ValidationError> {
        let pattern = match spec.pattern {
            Some(raw) => {
                let compiled = Regex::new(&raw).map_err(|err| ValidationError::InvalidPattern {
                    pattern: raw.clone(),
                    message: err.to_string(),
                })?;
                Some(compiled)
            }
            None => None,
        };

        let items = match spec.items {
            Some(item_spec) => Some(Box::new(Self::from_spec(*item_spec)?)),
            None => None,
        };

        let properties = match spec.properties {
            Some(specs) => {
                let mut compiled = IndexMap::with_capacity(specs.len());
                for (name, property_spec) in specs {
                    compiled.insert(name, Self::from_spec(property_spec)?);
                }
                Some(compiled)
            }
            None => None,
        };

        Ok(Self {
            kind: spec.kind,
            description: spec.description,
            required: spec.required,
            minimum: spec.minimum,
            maximum: spec.maximum,
            pattern,
            enum_values: spec.enum_values,
            items,
            properties,
        })
    }

    /// Compile directly from a raw JSON definition.
    pub fn from_value(definition: &Value) -> Result<Self, ValidationError> {
        let spec: ParameterSpec = serde_json::from_value(definition.clone())
            .map_err(|err| ValidationError::MalformedDefinition(err.to_string()))?;
        Self::from_spec(spec)
    }

    /// The source text of the pattern constraint, if one is set.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// Validate a single value against this schema.
    ///
    /// JSON `null` plays the absent role: it passes unless `required` is
    /// set on this schema.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.required {
                return Err(ValidationError::RequiredValueMissing);
            }
            return Ok(());
        }

        match self.kind {
            ParameterKind::String => self.validate_string(value),
            ParameterKind::Number => self.validate_number(value),
            ParameterKind::Boolean => match value {
                Value::Bool(_) => Ok(()),
                other => Err(self.mismatch(other)),
            },
            ParameterKind::Array => self.validate_array(value),
            ParameterKind::Object => self.validate_object(value),
            ParameterKind::Enum => self.validate_enum(value),
        }
    }

    fn mismatch(&self, value: &Value) -> ValidationError {
        ValidationError::KindMismatch {
            expected: self.kind,
            actual: json_kind(value),
        }
    }

    fn validate_string(&self, value: &Value) -> Result<(), ValidationError> {
        let text = value.as_str().ok_or_else(|| self.mismatch(value))?;
        if let Some(pattern) = &self.pattern {
            // The match must start at the beginning of the value; the end
            // is not anchored. A match elsewhere in the string is not
            // enough.
            let matches_from_start = pattern.find(text).is_some_and(|m| m.start() == 0);
            if !matches_from_start {
                return Err(ValidationError::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_number(&self, value: &Value) -> Result<(), ValidationError> {
        let number = match value {
            Value::Number(number) => number,
            other => return Err(self.mismatch(other)),
        };

        if let Some(numeric) = number.as_f64() {
            if let Some(minimum) = self.minimum {
                if numeric < minimum {
                    return Err(ValidationError::BelowMinimum {
                        value: numeric,
                        minimum,
                    });
                }
            }
            if let Some(maximum) = self.maximum {
                if numeric > maximum {
                    return Err(ValidationError::AboveMaximum {
                        value: numeric,
                        maximum,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_array(&self, value: &Value) -> Result<(), ValidationError> {
        let elements = value.as_array().ok_or_else(|| self.mismatch(value))?;
        if let Some(item_schema) = &self.items {
            for (index, element) in elements.iter().enumerate() {
                item_schema
                    .validate(element)
                    .map_err(|source| ValidationError::Element {
                        index,
                        source: Box::new(source),
                    })?;
            }
        }
        Ok(())
    }

    fn validate_object(&self, value: &Value) -> Result<(), ValidationError> {
        let map = value.as_object().ok_or_else(|| self.mismatch(value))?;
        if let Some(properties) = &self.properties {
            // Only listed properties present in the value are checked;
            // anything else passes through unvalidated.
            for (name, property_schema) in properties {
                if let Some(nested) = map.get(name) {
                    property_schema
                        .validate(nested)
                        .map_err(|source| ValidationError::Property {
                            name: name.clone(),
                            source: Box::new(source),
                        })?;
                }
            }
        }
        Ok(())
    }

    fn validate_enum(&self, value: &Value) -> Result<(), ValidationError> {
        let allowed = self
            .enum_values
            .as_ref()
            .ok_or(ValidationError::EnumValuesMissing)?;
        if !allowed.contains(value) {
            return Err(ValidationError::EnumMismatch {
                value: value.clone(),
                allowed: Value::Array(allowed.clone()),
            });
        }
        Ok(())
    }
}

/// Human-readable JSON kind name for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
