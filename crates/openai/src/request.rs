//! Chat completions wire format.

use ccore::{FinishReason, Message, Response, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// OpenAI-compatible chat completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The messages to send.
    pub messages: Vec<Message>,
    /// The model identifier.
    pub model: String,
    /// Tools the model may call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
}

impl From<&ccore::Request> for Request {
    fn from(req: &ccore::Request) -> Self {
        let tools = req.tools.as_ref().filter(|tools| !tools.is_empty()).map(|tools| {
            let tools = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": json!(tool),
                    })
                })
                .collect::<Vec<_>>();
            json!(tools)
        });

        Self {
            messages: req.messages.clone(),
            model: req.model.to_string(),
            tools,
        }
    }
}

/// OpenAI-compatible chat completions response body.
#[derive(Debug, Clone, Deserialize)]
pub struct WireResponse {
    /// The list of completion choices
    pub choices: Vec<Choice>,
}

/// A completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message
    pub message: Delta,

    /// The reason the model stopped generating
    pub finish_reason: Option<FinishReason>,
}

/// Message content in a completion response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    /// The content of the message
    pub content: Option<String>,

    /// Tool calls made by the model
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl From<WireResponse> for Response {
    fn from(wire: WireResponse) -> Self {
        let Some(choice) = wire.choices.into_iter().next() else {
            return Response::default();
        };

        Response {
            finish_reason: choice.finish_reason,
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        }
    }
}
