//! Tools the node serves out of the box.

use async_trait::async_trait;
use serde_json::{Map, Value};

use agora_protocol::{AgentCard, ToolError, ToolExecutor};

/// Name and description of each built-in tool, in card order.
pub const BUILTIN_TOOLS: &[(&str, &str)] = &[("echo", "Returns its parameters unchanged.")];

#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTools;

impl BuiltinTools {
    /// Advertise every built-in tool on `card`.
    pub fn describe(card: AgentCard) -> AgentCard {
        BUILTIN_TOOLS
            .iter()
            .fold(card, |card, (name, desc)| card.with_tool(*name, Some(desc.to_string())))
    }
}

#[async_trait]
impl ToolExecutor for BuiltinTools {
    async fn execute(&self, tool_name: &str, params: Map<String, Value>) -> Result<Value, ToolError> {
        match tool_name {
            "echo" => Ok(Value::Object(params)),
            other => Err(ToolError::NotFound(other.to_string())),
        }
    }
}
