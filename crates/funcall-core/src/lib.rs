pub mod caller;
pub mod handler;
pub mod prompt;
pub mod registry;

pub use caller::{CallError, FunctionCaller, DEFAULT_MAX_RETRIES};
pub use handler::{FunctionArgs, FunctionHandler, SharedHandler};
pub use prompt::build_system_prompt;
pub use registry::{FunctionInfo, FunctionRegistry, RegistryError};
