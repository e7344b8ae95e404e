//! Embedding port and its adapters
//!
//! The store only depends on [`Embedder`]. [`OpenAiEmbedder`] talks to any
//! OpenAI-compatible `/v1/embeddings` endpoint; with the `local-embeddings`
//! feature, [`FastEmbedder`] runs a fastembed model in-process instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{Error, Result};

/// Turns text into a fixed-length vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder backed by an OpenAI-compatible HTTP API
pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    http_client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            dimensions,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an embedder from the service configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.embedding_timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.embedding_api_url.clone(),
            model: config.embedding_model.clone(),
            api_key: config.embedding_api_key.clone(),
            dimensions: config.embedding_dimensions,
            http_client,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Embedding API error {}: {}",
                status, body_text
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::embedding("No embedding returned"))?;

        if embedding.len() != self.dimensions {
            return Err(Error::dimension_mismatch(self.dimensions, embedding.len()));
        }

        debug!(dimension = embedding.len(), "Generated embedding");
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use std::sync::Arc;

    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use tokio::sync::Mutex;
    use tracing::{info, instrument};

    use super::Embedder;
    use crate::error::{Error, Result};

    /// Embedder running all-MiniLM-L6-v2 locally (384 dimensions)
    pub struct FastEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
    }

    impl FastEmbedder {
        pub const DIMENSIONS: usize = crate::config::LOCAL_EMBEDDING_DIMENSIONS;

        /// Load the model; it downloads to ~/.cache/fastembed on first use
        pub fn new() -> Result<Self> {
            info!("Loading local embedding model all-MiniLM-L6-v2");
            let model = TextEmbedding::try_new(
                InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(true),
            )
            .map_err(|e| Error::embedding(format!("Failed to load embedding model: {}", e)))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
            })
        }
    }

    #[async_trait]
    impl Embedder for FastEmbedder {
        #[instrument(skip(self, text), fields(text_len = text.len()))]
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let model = self.model.clone().lock_owned().await;
            let text = text.to_string();

            // fastembed is synchronous
            let embeddings = tokio::task::spawn_blocking(move || {
                let mut model = model;
                model.embed(vec![text], None)
            })
            .await
            .map_err(|e| Error::embedding(format!("Embedding task failed: {}", e)))?
            .map_err(|e| Error::embedding(format!("Embedding failed: {}", e)))?;

            embeddings
                .into_iter()
                .next()
                .ok_or_else(|| Error::embedding("No embedding returned"))
        }

        fn dimensions(&self) -> usize {
            Self::DIMENSIONS
        }

        fn model_name(&self) -> &str {
            "all-MiniLM-L6-v2"
        }
    }
}
