use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Named-argument map passed to a handler after validation.
pub type FunctionArgs = Map<String, Value>;

/// A registered callable.
///
/// Implementations receive the validated argument map and return an
/// arbitrary JSON value, or an opaque error that the caller may retry.
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    async fn invoke(&self, args: FunctionArgs) -> anyhow::Result<Value>;
}

pub type SharedHandler = Arc<dyn FunctionHandler>;

/// Plain async closures double as handlers.
#[async_trait]
impl<F, Fut> FunctionHandler for F
where
    F: Fn(FunctionArgs) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, args: FunctionArgs) -> anyhow::Result<Value> {
        (self)(args).await
    }
}
