//! Capability listing shown to the model.

use crate::registry::FunctionInfo;

pub const NO_FUNCTIONS_PROMPT: &str = "No functions are currently available.";

pub const AVAILABLE_FUNCTIONS_HEADER: &str = "Available functions:\n\n";

/// Render the capability listing for a set of registered functions.
pub fn build_system_prompt(functions: &[FunctionInfo]) -> String {
    if functions.is_empty() {
        return NO_FUNCTIONS_PROMPT.to_string();
    }

    let mut prompt = String::from(AVAILABLE_FUNCTIONS_HEADER);
    for function in functions {
        prompt.push_str(&format!("- {}: {}\n", function.name, function.description));
    }
    prompt
}
