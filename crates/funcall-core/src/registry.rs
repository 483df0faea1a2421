//! Function registry: paired handler + schema records.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use funcall_schema::{validator, FunctionSchema, ValidationError};

use crate::handler::{FunctionHandler, SharedHandler};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("function '{0}' is already registered")]
    Duplicate(String),

    #[error("function '{0}' not found in registry")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Name and description of one registered function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub description: String,
}

struct RegisteredFunction {
    handler: SharedHandler,
    schema: Arc<FunctionSchema>,
}

/// Registry mapping function names to paired handler/schema records.
///
/// One lock guards one map, so a lookup can never observe a handler
/// without its schema or vice versa. Listing order is registration order.
pub struct FunctionRegistry {
    entries: RwLock<IndexMap<String, RegisteredFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a function under `name`.
    ///
    /// Fails on duplicate names (checked before the definition is looked
    /// at) and on malformed definitions; failures leave the registry
    /// unchanged.
    pub fn register<H>(&self, name: &str, handler: H, definition: &Value) -> Result<(), RegistryError>
    where
        H: FunctionHandler + 'static,
    {
        self.register_shared(name, Arc::new(handler), definition)
    }

    pub fn register_shared(
        &self,
        name: &str,
        handler: SharedHandler,
        definition: &Value,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let schema = compile_definition(name, definition)?;
        entries.insert(
            name.to_string(),
            RegisteredFunction {
                handler,
                schema: Arc::new(schema),
            },
        );
        info!("registered function '{name}'");
        Ok(())
    }

    /// Remove a function; both halves of the record go together.
    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap();
        if entries.shift_remove(name).is_none() {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        info!("unregistered function '{name}'");
        Ok(())
    }

    /// Replace the handler and schema of an already-registered function.
    ///
    /// This is an update, not an upsert: an absent name fails. The
    /// registry key stays authoritative; the new definition's own `name`
    /// field is not required to match it.
    pub fn update_function<H>(
        &self,
        name: &str,
        handler: H,
        definition: &Value,
    ) -> Result<(), RegistryError>
    where
        H: FunctionHandler + 'static,
    {
        let mut entries = self.entries.write().unwrap();
        if !entries.contains_key(name) {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        let schema = compile_definition(name, definition)?;
        entries.insert(
            name.to_string(),
            RegisteredFunction {
                handler: Arc::new(handler),
                schema: Arc::new(schema),
            },
        );
        info!("updated function '{name}'");
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> Option<SharedHandler> {
        self.entries
            .read()
            .unwrap()
            .get(name)
            .map(|entry| Arc::clone(&entry.handler))
    }

    pub fn get_schema(&self, name: &str) -> Option<Arc<FunctionSchema>> {
        self.entries
            .read()
            .unwrap()
            .get(name)
            .map(|entry| Arc::clone(&entry.schema))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().unwrap().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Registered functions in registration order.
    pub fn list_functions(&self) -> Vec<FunctionInfo> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|(name, entry)| FunctionInfo {
                name: name.clone(),
                description: entry.schema.description.clone(),
            })
            .collect()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_definition(name: &str, definition: &Value) -> Result<FunctionSchema, RegistryError> {
    validator::validate_function_definition(definition)
        .and_then(|_| FunctionSchema::from_definition(definition))
        .map_err(|err| {
            error!("invalid definition for function '{name}': {err}");
            RegistryError::Validation(err)
        })
}
