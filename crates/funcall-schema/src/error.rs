use serde_json::Value;
use thiserror::Error;

use crate::kind::ParameterKind;

/// A schema-definition problem or an argument-value-vs-schema mismatch.
///
/// Nested failures (array elements, object properties, named parameters)
/// wrap the inner error so the full path stays visible in the message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("required parameter is missing")]
    RequiredValueMissing,

    #[error("expected {expected}, got {actual}")]
    KindMismatch {
        expected: ParameterKind,
        actual: &'static str,
    },

    #[error("string does not match pattern: {pattern}")]
    PatternMismatch { pattern: String },

    #[error("value {value} is less than minimum {minimum}")]
    BelowMinimum { value: f64, minimum: f64 },

    #[error("value {value} is greater than maximum {maximum}")]
    AboveMaximum { value: f64, maximum: f64 },

    #[error("enum values not specified in schema")]
    EnumValuesMissing,

    #[error("value {value} is not one of the allowed values: {allowed}")]
    EnumMismatch { value: Value, allowed: Value },

    #[error("invalid element at index {index}: {source}")]
    Element {
        index: usize,
        source: Box<ValidationError>,
    },

    #[error("invalid value for property '{name}': {source}")]
    Property {
        name: String,
        source: Box<ValidationError>,
    },

    #[error("invalid value for parameter '{name}': {source}")]
    Parameter {
        name: String,
        source: Box<ValidationError>,
    },

    #[error("required parameter '{0}' is missing")]
    RequiredParameterMissing(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("function definition must be an object")]
    DefinitionNotObject,

    #[error("missing required field in function definition: {0}")]
    MissingDefinitionField(&'static str),

    #[error("parameters must be an object")]
    ParametersNotObject,

    #[error("parameter '{0}' is missing a type")]
    MissingParameterKind(String),

    #[error("parameter '{0}' is missing a description")]
    MissingParameterDescription(String),

    #[error("invalid parameter type for '{name}': {found}")]
    InvalidParameterKind { name: String, found: String },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("malformed definition: {0}")]
    MalformedDefinition(String),

    #[error("unsupported parameter type for '{0}'")]
    UnsupportedExample(String),
}
