//! Client for a remote recall-memory server

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::http::{ContextResponse, LoadResponse, SaveRequest, SaveResponse};

/// Talks to the HTTP API exposed by [`crate::http::create_router`]
#[derive(Debug, Clone)]
pub struct MemoryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl MemoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Store a message for a session, returning its sequence index
    pub async fn save(&self, session_id: &str, message: &str) -> Result<usize> {
        let body = SaveRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
        };
        let response = self
            .http_client
            .post(self.endpoint(&["save"])?)
            .json(&body)
            .send()
            .await?;

        let saved: SaveResponse = Self::decode(response).await?;
        Ok(saved.sequence_index)
    }

    /// Messages from the session closest to `query`
    pub async fn context(
        &self,
        session_id: &str,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut request = self
            .http_client
            .get(self.endpoint(&["context", session_id])?)
            .query(&[("query", query)]);
        if let Some(top_k) = top_k {
            request = request.query(&[("top_k", top_k)]);
        }

        let context: ContextResponse = Self::decode(request.send().await?).await?;
        Ok(context.context)
    }

    /// Every message stored for the session
    pub async fn load(&self, session_id: &str) -> Result<Vec<String>> {
        let response = self
            .http_client
            .get(self.endpoint(&["load", session_id])?)
            .send()
            .await?;

        let loaded: LoadResponse = Self::decode(response).await?;
        Ok(loaded.messages)
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid memory server URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("memory server URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
