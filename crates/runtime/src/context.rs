//! Collaborators shared by every agent of a session.

use crate::{Config, DuckDuckGo, PromptCache, Search};
use anyhow::{Context as _, Result};
use ccore::{Gateway, Message, Request, Response};
use std::sync::Arc;

/// The gateway, search provider, prompt cache and config of a session.
///
/// Cloning is cheap; every agent holds its own copy.
#[derive(Clone)]
pub struct Context<G: Gateway> {
    /// The model gateway.
    pub gateway: G,
    /// External information lookup.
    pub search: Arc<dyn Search>,
    /// Subject prompt cache.
    pub cache: Arc<PromptCache>,
    /// Runtime settings.
    pub config: Arc<Config>,
}

impl<G: Gateway> Context<G> {
    /// Create a context with the default search provider and the prompt
    /// cache at `config.paths.cache`.
    pub fn new(gateway: G, config: Config) -> Self {
        Self {
            gateway,
            search: Arc::new(DuckDuckGo::new(reqwest::Client::new())),
            cache: Arc::new(PromptCache::open(&config.paths.cache)),
            config: Arc::new(config),
        }
    }

    /// Replace the search provider.
    pub fn with_search(mut self, search: impl Search + 'static) -> Self {
        self.search = Arc::new(search);
        self
    }

    /// Send one request, bounded by the configured timeout.
    pub async fn complete(&self, request: &Request) -> Result<Response> {
        tracing::debug!(
            "gateway request: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len)
        );

        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.gateway.send(request))
                .await
                .with_context(|| format!("gateway call timed out after {}s", limit.as_secs()))?,
            None => self.gateway.send(request).await,
        }
    }

    /// One-shot completion of `prompt` with no history and no tools.
    pub async fn complete_text(&self, prompt: &str, model: &str) -> Result<String> {
        let request = Request::new(model).with_messages(vec![Message::user(prompt)]);
        let response = self.complete(&request).await?;
        Ok(response.content.unwrap_or_default())
    }
}
