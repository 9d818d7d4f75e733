//! Tool descriptors exchanged with the model

use compact_str::CompactString;
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};

/// A tool the model may call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: CompactString,

    /// The description of the tool
    pub description: String,

    /// The parameters of the tool
    pub parameters: Schema,
}

impl Tool {
    /// Build a tool whose parameter schema is derived from `T`.
    pub fn new<T: JsonSchema>(name: impl Into<CompactString>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: schemars::schema_for!(T),
        }
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolCall {
    /// The ID of the tool call
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub id: CompactString,

    /// The type of tool (currently only "function")
    #[serde(default, rename = "type")]
    pub call_type: CompactString,

    /// The function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function call with raw JSON arguments.
    pub fn new(name: impl Into<CompactString>, arguments: impl Into<String>) -> Self {
        Self {
            id: CompactString::default(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// A function call within a tool call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionCall {
    /// The name of the function to call
    #[serde(default)]
    pub name: CompactString,

    /// The arguments to pass to the function (JSON string)
    #[serde(default)]
    pub arguments: String,
}
