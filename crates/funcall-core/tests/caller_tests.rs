//! End-to-end tests for the FunctionCaller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use funcall_core::{
    CallError, FunctionArgs, FunctionCaller, FunctionHandler, FunctionRegistry, RegistryError,
};
use funcall_schema::ValidationError;

/// Handler that fails until a set number of invocations have happened.
#[derive(Debug)]
struct FlakyHandler {
    invocations: Arc<AtomicUsize>,
    fail_until: usize,
}

#[async_trait]
impl FunctionHandler for FlakyHandler {
    async fn invoke(&self, _args: FunctionArgs) -> anyhow::Result<Value> {
        let attempt = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_until {
            return Err(anyhow!("transient failure on attempt {attempt}"));
        }
        Ok(json!("success"))
    }
}

fn greet_definition() -> Value {
    json!({
        "name": "greet",
        "description": "Greet a person",
        "parameters": {
            "name": {"type": "string", "description": "The person's name"},
            "age": {"type": "number", "description": "The person's age", "minimum": 0}
        },
        "required": ["name"]
    })
}

fn no_params_definition(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} function"),
        "parameters": {}
    })
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("arguments must be an object")
}

fn caller() -> FunctionCaller {
    FunctionCaller::new(Arc::new(FunctionRegistry::new()))
}

async fn greet(arguments: FunctionArgs) -> anyhow::Result<Value> {
    let name = arguments
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("stranger");
    Ok(json!(format!("Hello, {name}!")))
}

#[tokio::test]
async fn calls_a_registered_function() {
    let caller = caller();
    caller
        .register_function("greet", greet, &greet_definition())
        .unwrap();

    let result = caller
        .call_function("greet", args(json!({"name": "Alice", "age": 25})))
        .await
        .unwrap();
    assert_eq!(result, json!("Hello, Alice!"));
}

#[tokio::test]
async fn rejects_invalid_parameters_without_invoking() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let caller = caller();
    caller
        .register_function(
            "greet",
            FlakyHandler {
                invocations: Arc::clone(&invocations),
                fail_until: 0,
            },
            &greet_definition(),
        )
        .unwrap();

    let missing = caller.call_function("greet", args(json!({}))).await;
    assert!(matches!(
        missing,
        Err(CallError::Validation(ValidationError::RequiredParameterMissing(name))) if name == "name"
    ));

    let negative = caller
        .call_function("greet", args(json!({"name": "Alice", "age": -1})))
        .await;
    assert!(matches!(negative, Err(CallError::Validation(_))));

    let wrong_kind = caller
        .call_function("greet", args(json!({"name": 123})))
        .await;
    assert!(matches!(wrong_kind, Err(CallError::Validation(_))));

    assert_eq!(
        invocations.load(Ordering::SeqCst),
        0,
        "validation failures must never reach the handler"
    );
}

#[tokio::test]
async fn unknown_function_fails_without_retry() {
    let caller = caller();
    let result = caller.call_function("ghost", Map::new()).await;
    assert!(matches!(result, Err(CallError::UnknownFunction(name)) if name == "ghost"));
}

#[tokio::test]
async fn retries_until_the_handler_succeeds() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let caller = caller();
    caller
        .register_function(
            "flaky",
            FlakyHandler {
                invocations: Arc::clone(&invocations),
                fail_until: 2,
            },
            &no_params_definition("flaky"),
        )
        .unwrap();

    let result = caller
        .call_function_with_retries("flaky", Map::new(), 3)
        .await
        .unwrap();
    assert_eq!(result, json!("success"));
    assert_eq!(invocations.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_failure() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let caller = caller();
    caller
        .register_function(
            "doomed",
            FlakyHandler {
                invocations: Arc::clone(&invocations),
                fail_until: usize::MAX,
            },
            &no_params_definition("doomed"),
        )
        .unwrap();

    let result = caller
        .call_function_with_retries("doomed", Map::new(), 2)
        .await;
    assert_eq!(invocations.load(Ordering::SeqCst), 2);

    match result {
        Err(CallError::RetriesExhausted { name, attempts, source }) => {
            assert_eq!(name, "doomed");
            assert_eq!(attempts, 2);
            assert!(source.to_string().contains("attempt 2"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_retries_still_makes_one_attempt() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let caller = caller();
    caller
        .register_function(
            "once",
            FlakyHandler {
                invocations: Arc::clone(&invocations),
                fail_until: 0,
            },
            &no_params_definition("once"),
        )
        .unwrap();

    let result = caller
        .call_function_with_retries("once", Map::new(), 0)
        .await
        .unwrap();
    assert_eq!(result, json!("success"));
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[test]
fn system_prompt_tracks_caller_mutations() {
    let caller = caller();
    assert!(caller
        .system_prompt()
        .contains("No functions are currently available"));

    caller
        .register_function("greet", greet, &greet_definition())
        .unwrap();
    let prompt = caller.system_prompt();
    assert!(prompt.contains("greet"));
    assert!(prompt.contains("Greet a person"));

    caller.unregister_function("greet").unwrap();
    assert!(caller
        .system_prompt()
        .contains("No functions are currently available"));
}

#[test]
fn system_prompt_reflects_updates() {
    let caller = caller();
    caller
        .register_function("greet", greet, &greet_definition())
        .unwrap();

    let updated = json!({
        "name": "greet",
        "description": "Updated greeting",
        "parameters": {
            "name": {"type": "string", "description": "The person's name"}
        },
        "required": ["name"]
    });
    caller.update_function("greet", greet, &updated).unwrap();

    let prompt = caller.system_prompt();
    assert!(prompt.contains("Updated greeting"));
    assert!(!prompt.contains("Greet a person"));
}

#[test]
fn direct_registry_mutation_leaves_the_prompt_stale() {
    let registry = Arc::new(FunctionRegistry::new());
    let caller = FunctionCaller::new(Arc::clone(&registry));

    registry
        .register("greet", greet, &greet_definition())
        .unwrap();

    // The caller never saw the mutation, so the cache is stale until a
    // refresh.
    assert!(caller
        .system_prompt()
        .contains("No functions are currently available"));

    caller.refresh_system_prompt();
    assert!(caller.system_prompt().contains("greet"));
}

#[test]
fn failed_registration_keeps_prompt_and_registry_unchanged() {
    let caller = caller();
    let missing_description = json!({"name": "broken", "parameters": {}});

    let result = caller.register_function("broken", greet, &missing_description);
    assert!(matches!(result, Err(RegistryError::Validation(_))));
    assert!(caller
        .system_prompt()
        .contains("No functions are currently available"));
    assert!(!caller.registry().contains("broken"));
}

#[tokio::test]
async fn calling_after_unregistration_fails() {
    let caller = caller();
    caller
        .register_function("greet", greet, &greet_definition())
        .unwrap();
    caller.unregister_function("greet").unwrap();

    let result = caller
        .call_function("greet", args(json!({"name": "Alice"})))
        .await;
    assert!(matches!(result, Err(CallError::UnknownFunction(_))));
}
