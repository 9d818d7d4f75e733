//! Gateway trait implementation for the OpenAI-compatible provider.

use crate::{OpenAI, Request, WireResponse};
use anyhow::{Context, Result};
use ccore::{Gateway, Response};
use reqwest::Method;

impl Gateway for OpenAI {
    async fn send(&self, request: &ccore::Request) -> Result<Response> {
        let body = Request::from(request);
        tracing::trace!("request: {}", serde_json::to_string(&body)?);
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.endpoint))?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("response: {}", text);
        if !status.is_success() {
            anyhow::bail!("gateway returned {status}: {text}");
        }

        let wire: WireResponse =
            serde_json::from_str(&text).context("failed to decode chat completion")?;
        Ok(wire.into())
    }
}
