//! OpenAI-compatible model gateway.
//!
//! Covers OpenAI and any other service exposing the chat completions API
//! (Ollama, vLLM, LM Studio, ...). Only the non-streaming path is used:
//! the runtime needs whole answers to decide on tool dispatch.

use reqwest::{
    Client,
    header::{self, HeaderMap},
};
pub use request::{Choice, Delta, Request, WireResponse};

mod provider;
mod request;

/// Default base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// An OpenAI-compatible gateway.
#[derive(Clone)]
pub struct OpenAI {
    /// The HTTP client.
    pub client: Client,
    /// Request headers (authorization, content-type).
    headers: HeaderMap,
    /// Chat completions endpoint URL.
    endpoint: String,
}

impl OpenAI {
    /// Create a gateway for `base_url`, authenticating with `key` when it
    /// is non-empty.
    pub fn new(client: Client, base_url: &str, key: &str) -> anyhow::Result<Self> {
        if key.is_empty() {
            Self::no_auth(client, base_url)
        } else {
            Self::bearer(client, base_url, key)
        }
    }

    /// Create a gateway with Bearer token authentication.
    pub fn bearer(client: Client, base_url: &str, key: &str) -> anyhow::Result<Self> {
        let mut headers = base_headers()?;
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint(base_url),
        })
    }

    /// Create a gateway without authentication (e.g. a local server).
    pub fn no_auth(client: Client, base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            headers: base_headers()?,
            endpoint: endpoint(base_url),
        })
    }

    /// The chat completions endpoint this gateway posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn base_headers() -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
    headers.insert(header::ACCEPT, "application/json".parse()?);
    Ok(headers)
}

/// Append `/chat/completions` to a base URL unless it is already there.
pub fn endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_owned()
    } else {
        format!("{base}/chat/completions")
    }
}
