//! Tools every participant exposes.

use crate::{Participant, Toolbox, toolbox};
use anyhow::Result;
use futures_util::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Arguments of `fetch_external_info`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FetchExternalInfo {
    /// The search query
    pub query: String,
}

/// Arguments of `save_content_to_file`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveContentToFile {
    /// The content to save
    pub content: String,
    /// The file path where the content will be saved
    pub filepath: String,
}

/// The base tool set, bound to any participant type.
pub fn toolbox<P: Participant>() -> Toolbox<P> {
    let mut tools = Toolbox::new();
    tools
        .register::<FetchExternalInfo>(
            "fetch_external_info",
            "Fetches online external information for a given query.",
            fetch_external_info::<P>,
        )
        .register::<SaveContentToFile>(
            "save_content_to_file",
            "Saves content to a file.",
            save_content_to_file::<P>,
        );
    tools
}

fn fetch_external_info<P: Participant>(
    participant: &mut P,
    args: Value,
) -> BoxFuture<'_, Result<Option<String>>> {
    Box::pin(async move {
        let FetchExternalInfo { query } = toolbox::args(args)?;
        Ok(Some(participant.agent().fetch_external_info(&query).await))
    })
}

fn save_content_to_file<P: Participant>(
    participant: &mut P,
    args: Value,
) -> BoxFuture<'_, Result<Option<String>>> {
    Box::pin(async move {
        let SaveContentToFile { content, filepath } = toolbox::args(args)?;
        let saved = participant
            .agent()
            .save_content_to_file(&content, &filepath)?;
        Ok(saved.map(|path| format!("Saved content to {}", path.display())))
    })
}
