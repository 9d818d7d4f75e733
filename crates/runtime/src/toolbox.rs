//! Tool dispatch.
//!
//! A [`Toolbox`] is the explicit table of tools a participant exposes to
//! the model: each name maps to its descriptor and a typed handler. The
//! table is built once per participant type, so the legal tool surface is
//! always known up front.

use crate::Participant;
use anyhow::Result;
use ccore::{Tool, ToolCall};
use compact_str::CompactString;
use futures_util::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// A tool handler bound to participant type `P`.
///
/// `Ok(None)` means the tool ran but produced nothing to report.
pub type Handler<P> = for<'a> fn(&'a mut P, Value) -> BoxFuture<'a, Result<Option<String>>>;

/// Name → (descriptor, handler) table for one participant type.
pub struct Toolbox<P> {
    entries: BTreeMap<CompactString, (Tool, Handler<P>)>,
}

impl<P: Participant> Toolbox<P> {
    /// An empty toolbox.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a tool whose arguments deserialize into `A`.
    ///
    /// The parameter schema is derived from `A`. Registering an existing
    /// name replaces it.
    pub fn register<A: JsonSchema>(
        &mut self,
        name: &str,
        description: &str,
        handler: Handler<P>,
    ) -> &mut Self {
        let tool = Tool::new::<A>(name, description);
        self.entries.insert(tool.name.clone(), (tool, handler));
        self
    }

    /// Tool descriptors, sorted by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.values().map(|(tool, _)| tool.clone()).collect()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(CompactString::as_str)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Run one tool call against `participant` and return its text.
    ///
    /// Never fails: unknown tools, bad arguments and handler errors all
    /// come back as text for the conversation.
    pub async fn dispatch(&self, participant: &mut P, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        let Some(handler) = self.entries.get(name).map(|(_, handler)| *handler) else {
            tracing::warn!("model requested unknown tool '{name}'");
            return not_found(name);
        };

        tracing::debug!("dispatching tool '{name}'");
        let result = match parse_arguments(&call.function.arguments) {
            Ok(args) => handler(participant, args).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(output)) => output,
            Ok(None) => no_result(name),
            Err(e) => {
                tracing::warn!("tool '{name}' failed: {e}");
                format!("\n\nError calling function `{name}`: {e}")
            }
        }
    }
}

impl<P: Participant> Default for Toolbox<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text returned for a tool that is not registered.
pub fn not_found(name: &str) -> String {
    format!("\n\nFunction `{name}` not found or not callable.")
}

/// Text returned for a tool that ran without output.
pub fn no_result(name: &str) -> String {
    format!("\n\nFunction `{name}` executed with no result.")
}

/// Decode tool arguments into `T`.
pub fn args<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| anyhow::anyhow!("invalid arguments: {e}"))
}

fn parse_arguments(arguments: &str) -> Result<Value> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(arguments).map_err(|e| anyhow::anyhow!("invalid arguments: {e}"))
}
