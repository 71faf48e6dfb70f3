use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function definition offered to the generation model.
///
/// The input schema is a JSON-schema value built fresh per request by the
/// schema builder, so the accepted `estimates` keys always track the resolved
/// sub-region list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A tool invocation extracted from a model response.
///
/// `id` is an opaque correlation token; the paired `tool_result` block must
/// echo it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUse {
    pub fn new<I, N>(id: I, name: N, input: Value) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}
