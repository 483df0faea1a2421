use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of kinds a parameter value may be validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Enum,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Array => "array",
            ParameterKind::Object => "object",
            ParameterKind::Enum => "enum",
        }
    }

    /// Parse the wire form used in raw definitions.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(ParameterKind::String),
            "number" => Some(ParameterKind::Number),
            "boolean" => Some(ParameterKind::Boolean),
            "array" => Some(ParameterKind::Array),
            "object" => Some(ParameterKind::Object),
            "enum" => Some(ParameterKind::Enum),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
