//! Core abstractions for the Conclave agent runtime.
//!
//! Holds the conversation primitives ([`Message`], [`Role`]), the tool
//! descriptors exchanged with the model ([`Tool`], [`ToolCall`]) and the
//! [`Gateway`] trait every model backend implements.

pub use {
    gateway::{FinishReason, Gateway, Request, Response},
    message::{Message, Role},
    tool::{FunctionCall, Tool, ToolCall},
};

mod gateway;
mod message;
mod tool;

#[cfg(feature = "testing")]
pub mod testing;
