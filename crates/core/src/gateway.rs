//! The model gateway boundary.
//!
//! A [`Gateway`] takes an ordered list of turns plus an optional tool
//! catalog and answers with free text, tool calls, or both. Backends live
//! in their own crates; the runtime only ever talks to this trait.

use crate::{Message, Tool, ToolCall};
use anyhow::Result;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A model backend.
///
/// Implementations are cheap to clone; every agent holds its own handle.
pub trait Gateway: Clone + Send + Sync + 'static {
    /// Send one request and wait for the complete response.
    fn send(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;
}

/// A chat completion request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    /// The model to use.
    pub model: CompactString,

    /// The conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// The tools available for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

impl Request {
    /// Create a new request for the given model.
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            tools: None,
        }
    }

    /// Set the messages for this request.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the tools for this request.
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// The system turn, if the request carries one.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == crate::Role::System)
            .map(|m| m.content.as_str())
    }

    /// The most recent user turn.
    pub fn last_user(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A complete model response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Response {
    /// Why the model stopped generating.
    pub finish_reason: Option<FinishReason>,

    /// Free text produced by the model.
    pub content: Option<String>,

    /// Tool invocations requested by the model, in order.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Response {
    /// A plain text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(FinishReason::Stop),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A response asking the host to run tools.
    pub fn tools(calls: Vec<ToolCall>) -> Self {
        Self {
            finish_reason: Some(FinishReason::ToolCalls),
            content: None,
            tool_calls: calls,
        }
    }

    /// Attach leading text to the response.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished naturally
    Stop,

    /// The model hit the max token limit
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    ToolCalls,

    /// Anything else the backend reports
    #[serde(other)]
    Other,
}
