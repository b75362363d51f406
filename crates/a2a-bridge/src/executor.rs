//! The executor contract wrapped by [`AdapterAgent`](crate::AdapterAgent)

use async_trait::async_trait;
use std::sync::Arc;

/// Anything that turns a text input into a text output.
///
/// Execution is single-shot: one call, one complete answer, no partial output.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// Executor name, used as the default agent id and display name
    fn name(&self) -> &str;

    /// Human-readable description of what the executor does
    fn description(&self) -> &str;

    /// Run the executor on one input
    async fn execute(&self, input: &str) -> anyhow::Result<String>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        (**self).execute(input).await
    }
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        (**self).execute(input).await
    }
}
