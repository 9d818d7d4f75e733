//! External information lookup.

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

/// Answer when the lookup itself failed.
pub const SEARCH_FAILED: &str = "Failed to fetch external information.";

/// Answer when the lookup succeeded but found nothing.
pub const SEARCH_EMPTY: &str = "No relevant information found.";

/// A web search/fetch collaborator.
///
/// Never fails: transport and decode errors are reported as text so the
/// model can see them.
pub trait Search: Send + Sync {
    /// Look up `query` and return a text snippet.
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, String>;
}

/// DuckDuckGo Instant Answer lookup.
#[derive(Clone)]
pub struct DuckDuckGo {
    client: Client,
    endpoint: String,
}

impl DuckDuckGo {
    /// Instant Answer API endpoint.
    pub const ENDPOINT: &'static str = "https://api.duckduckgo.com/";

    /// Create a lookup against the public endpoint.
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, Self::ENDPOINT)
    }

    /// Create a lookup against a custom endpoint.
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn lookup(&self, query: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("search returned {}", response.status());
        }

        let answer: InstantAnswer = response.json().await?;
        Ok(Some(answer.abstract_text).filter(|text| !text.is_empty()))
    }
}

impl Search for DuckDuckGo {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, String> {
        Box::pin(async move {
            match self.lookup(query).await {
                Ok(Some(text)) => text,
                Ok(None) => SEARCH_EMPTY.to_owned(),
                Err(e) => {
                    tracing::warn!("search for '{query}' failed: {e}");
                    SEARCH_FAILED.to_owned()
                }
            }
        })
    }
}

#[derive(Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
}
