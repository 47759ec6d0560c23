//! Collaborators the handler delegates to.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure reported by a [`ToolExecutor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// Runs a named tool. Implementations own any timeout they need.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool_name: &str, params: Map<String, Value>)
        -> Result<Value, ToolError>;
}

/// Supplies the agent card served to `agent_card` and `capability_query`.
pub trait CardProvider: Send + Sync {
    fn card(&self) -> Value;
}

impl<F> CardProvider for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn card(&self) -> Value {
        self()
    }
}
