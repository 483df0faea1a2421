//! Call orchestration: validation, bounded retry, capability listing.

use std::sync::{Arc, RwLock};

use log::{error, info, warn};
use serde_json::Value;
use thiserror::Error;

use funcall_schema::ValidationError;

use crate::handler::{FunctionArgs, FunctionHandler};
use crate::prompt::build_system_prompt;
use crate::registry::{FunctionRegistry, RegistryError};

/// Default number of invocation attempts per call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("function '{0}' is not registered")]
    UnknownFunction(String),

    #[error("schema for function '{0}' is missing")]
    MissingSchema(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("function '{name}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        name: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
}

/// Dispatcher for registered functions.
///
/// Keeps a cached capability listing in sync with mutations performed
/// through its own entry points. Mutating the registry directly leaves
/// the cached listing stale until the next refresh.
pub struct FunctionCaller {
    registry: Arc<FunctionRegistry>,
    system_prompt: RwLock<String>,
}

impl FunctionCaller {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        let system_prompt = RwLock::new(build_system_prompt(&registry.list_functions()));
        Self {
            registry,
            system_prompt,
        }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Current capability listing, suitable for a model prompt.
    pub fn system_prompt(&self) -> String {
        self.system_prompt.read().unwrap().clone()
    }

    /// Rebuild the capability listing from the registry.
    pub fn refresh_system_prompt(&self) {
        let prompt = build_system_prompt(&self.registry.list_functions());
        *self.system_prompt.write().unwrap() = prompt;
    }

    pub async fn call_function(&self, name: &str, args: FunctionArgs) -> Result<Value, CallError> {
        self.call_function_with_retries(name, args, DEFAULT_MAX_RETRIES)
            .await
    }

    /// Validate `args` against the registered schema, then invoke the
    /// handler with up to `max_retries` attempts, counted inclusive of
    /// the first try and with no delay in between. Lookup and validation
    /// failures are never retried.
    pub async fn call_function_with_retries(
        &self,
        name: &str,
        args: FunctionArgs,
        max_retries: u32,
    ) -> Result<Value, CallError> {
        let handler = self
            .registry
            .get_function(name)
            .ok_or_else(|| CallError::UnknownFunction(name.to_string()))?;
        let schema = self
            .registry
            .get_schema(name)
            .ok_or_else(|| CallError::MissingSchema(name.to_string()))?;

        if let Err(err) = schema.validate_parameters(&args) {
            error!("parameter validation failed for '{name}': {err}");
            return Err(CallError::Validation(err));
        }

        let attempts = max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match handler.invoke(args.clone()).await {
                Ok(result) => {
                    info!("function '{name}' succeeded on attempt {attempt}");
                    return Ok(result);
                }
                Err(err) => {
                    warn!("attempt {attempt} failed for '{name}': {err}");
                    last_error = Some(err);
                }
            }
        }

        error!("function '{name}' failed after {attempts} attempts");
        Err(CallError::RetriesExhausted {
            name: name.to_string(),
            attempts,
            source: last_error
                .unwrap_or_else(|| anyhow::anyhow!("retry attempts exhausted")),
        })
    }

    /// Register a function and rebuild the capability listing.
    pub fn register_function<H>(
        &self,
        name: &str,
        handler: H,
        definition: &Value,
    ) -> Result<(), RegistryError>
    where
        H: FunctionHandler + 'static,
    {
        self.registry.register(name, handler, definition)?;
        self.refresh_system_prompt();
        Ok(())
    }

    /// Unregister a function and rebuild the capability listing.
    pub fn unregister_function(&self, name: &str) -> Result<(), RegistryError> {
        self.registry.unregister(name)?;
        self.refresh_system_prompt();
        Ok(())
    }

    /// Update a function and rebuild the capability listing.
    pub fn update_function<H>(
        &self,
        name: &str,
        handler: H,
        definition: &Value,
    ) -> Result<(), RegistryError>
    where
        H: FunctionHandler + 'static,
    {
        self.registry.update_function(name, handler, definition)?;
        self.refresh_system_prompt();
        Ok(())
    }
}
