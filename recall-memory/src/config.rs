//! Configuration for recall-memory

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Which embedding adapter the server builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// OpenAI-compatible HTTP API
    OpenAi,
    /// In-process fastembed model (requires the `local-embeddings` feature)
    Local,
}

impl FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbedderKind::OpenAi),
            "local" => Ok(EmbedderKind::Local),
            other => Err(format!("unknown embedder '{}', expected 'openai' or 'local'", other)),
        }
    }
}

/// Dimensions of the local all-MiniLM-L6-v2 model
pub const LOCAL_EMBEDDING_DIMENSIONS: usize = 384;

/// Configuration for the memory service
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding adapter to use
    pub embedder: EmbedderKind,

    /// Embedding dimensions (1536 for text-embedding-3-small)
    pub embedding_dimensions: usize,

    /// Embedding model requested from the embedding API
    pub embedding_model: String,

    /// Base URL of the OpenAI-compatible embedding API
    pub embedding_api_url: String,

    /// Bearer token for the embedding API
    pub embedding_api_key: Option<String>,

    /// Per-request timeout for embedding calls
    pub embedding_timeout: Duration,

    /// Number of messages returned by a context query when the caller gives none
    pub default_top_k: usize,

    /// HTTP server bind address
    pub server_host: String,

    /// HTTP server port
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::OpenAi,
            embedding_dimensions: 1536,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_url: "https://api.openai.com".to_string(),
            embedding_api_key: None,
            embedding_timeout: Duration::from_secs(30),
            default_top_k: 5,
            server_host: "127.0.0.1".to_string(),
            server_port: 8001,
        }
    }
}

impl Config {
    /// Build a config from defaults overridden by `RECALL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("RECALL_HOST") {
            config.server_host = host;
        }
        if let Some(port) = parse_var(&lookup, "RECALL_PORT")? {
            config.server_port = port;
        }
        if let Some(kind) = parse_var(&lookup, "RECALL_EMBEDDER")? {
            config.embedder = kind;
        }
        match parse_var(&lookup, "RECALL_EMBEDDING_DIMENSIONS")? {
            Some(dims) => config.embedding_dimensions = dims,
            None if config.embedder == EmbedderKind::Local => {
                config.embedding_dimensions = LOCAL_EMBEDDING_DIMENSIONS;
            }
            None => {}
        }
        if let Some(top_k) = parse_var(&lookup, "RECALL_TOP_K")? {
            config.default_top_k = top_k;
        }
        if let Some(model) = lookup("RECALL_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(url) = lookup("RECALL_EMBEDDING_API_URL") {
            config.embedding_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "RECALL_EMBEDDING_TIMEOUT_SECS")? {
            config.embedding_timeout = Duration::from_secs(secs);
        }
        config.embedding_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the store cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than zero"));
        }
        if self.default_top_k == 0 {
            return Err(Error::config("default top_k must be greater than zero"));
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("invalid {}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}
