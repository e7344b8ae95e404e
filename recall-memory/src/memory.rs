//! Per-session message store with semantic retrieval

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::message::MessageRecord;
use crate::retrieval::{session_neighbors, RetrievedMessage};
use crate::storage::{FlatIndex, SessionLogs, VectorIndex};

/// Counts reported by [`SessionMemoryStore::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub entries: usize,
    pub dimensions: usize,
}

/// Index and logs share one lock so they can never be observed out of step
struct Inner<I> {
    index: I,
    logs: SessionLogs,
}

/// The main store: session logs plus a shared vector index.
///
/// Embedding calls happen before the lock is taken, so a slow embedding
/// request only holds up its own caller.
pub struct SessionMemoryStore<I = FlatIndex<MessageRecord>> {
    embedder: Arc<dyn Embedder>,
    inner: RwLock<Inner<I>>,
    default_top_k: usize,
}

impl SessionMemoryStore {
    /// Create a store backed by an exact flat index sized for the embedder
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let index = FlatIndex::new(embedder.dimensions());
        Self {
            embedder,
            inner: RwLock::new(Inner {
                index,
                logs: SessionLogs::new(),
            }),
            default_top_k: Config::default().default_top_k,
        }
    }

    /// Create a store using the configured defaults
    pub fn from_config(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        if embedder.dimensions() != config.embedding_dimensions {
            return Err(Error::config(format!(
                "embedder '{}' produces {}-dim vectors but config specifies {}",
                embedder.model_name(),
                embedder.dimensions(),
                config.embedding_dimensions
            )));
        }

        info!(
            model = embedder.model_name(),
            dimensions = config.embedding_dimensions,
            default_top_k = config.default_top_k,
            "Initializing session memory store"
        );

        Ok(Self::new(embedder).with_default_top_k(config.default_top_k))
    }
}

impl<I: VectorIndex<MessageRecord>> SessionMemoryStore<I> {
    /// Create a store over a caller-supplied index
    pub fn with_index(embedder: Arc<dyn Embedder>, index: I) -> Result<Self> {
        if index.dimensions() != embedder.dimensions() {
            return Err(Error::dimension_mismatch(
                index.dimensions(),
                embedder.dimensions(),
            ));
        }
        if !index.is_empty() {
            return Err(Error::config(
                "a session store must start from an empty index",
            ));
        }

        Ok(Self {
            embedder,
            inner: RwLock::new(Inner {
                index,
                logs: SessionLogs::new(),
            }),
            default_top_k: Config::default().default_top_k,
        })
    }

    /// Set the result count used when a context query gives none
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Embed and store a message, returning its sequence index.
    ///
    /// Nothing is written unless the embedding succeeds and the index accepts
    /// the vector.
    pub async fn add_message(&self, session_id: &str, text: &str) -> Result<usize> {
        let vector = self.embedder.embed(text).await?;

        let mut inner = self.inner.write().await;
        let sequence_index = inner
            .index
            .insert(vector, MessageRecord::new(session_id, text))?;
        inner.logs.append(session_id, text.to_string());

        debug!(
            session_id = %session_id,
            sequence_index = sequence_index,
            entries = inner.index.len(),
            "Stored message"
        );

        Ok(sequence_index)
    }

    /// All messages for a session in insertion order
    pub async fn get_messages(&self, session_id: &str) -> Vec<String> {
        self.inner.read().await.logs.read_all(session_id)
    }

    /// The session's messages closest to `query`, nearest first
    pub async fn semantic_context(
        &self,
        session_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>> {
        let hits = self
            .semantic_context_scored(session_id, query, top_k)
            .await?;
        Ok(hits.into_iter().map(|m| m.text).collect())
    }

    /// Like [`Self::semantic_context`], keeping each hit's sequence index and
    /// squared L2 distance
    pub async fn semantic_context_scored(
        &self,
        session_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedMessage>> {
        {
            let inner = self.inner.read().await;
            if top_k == 0 || inner.index.is_empty() || inner.logs.count(session_id) == 0 {
                debug!(session_id = %session_id, "No entries to search");
                return Ok(Vec::new());
            }
        }

        let vector = self.embedder.embed(query).await?;

        let inner = self.inner.read().await;
        let hits = session_neighbors(&inner.index, &vector, session_id, top_k)?;

        debug!(
            session_id = %session_id,
            top_k = top_k,
            returned = hits.len(),
            entries = inner.index.len(),
            "Semantic context retrieved"
        );

        Ok(hits)
    }

    /// The record stored at a sequence index returned by [`Self::add_message`]
    pub async fn record_at(&self, sequence_index: usize) -> Result<MessageRecord> {
        let inner = self.inner.read().await;
        inner.index.metadata_at(sequence_index).cloned()
    }

    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        StoreStats {
            sessions: inner.logs.session_count(),
            entries: inner.index.len(),
            dimensions: inner.index.dimensions(),
        }
    }

    /// Drop every session and vector
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.index.clear();
        inner.logs.clear();
        info!("Session memory store reset");
    }
}
