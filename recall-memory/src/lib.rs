//! # Recall Memory
//!
//! Per-session semantic memory for conversational agents.
//!
//! ## Architecture
//!
//! - **Embedder** - port turning text into a fixed-length vector
//! - **VectorIndex** - append-only vectors with exact L2 nearest-neighbor search
//! - **SessionMemoryStore** - per-session logs plus session-filtered retrieval
//!
//! Everything lives in process memory; nothing survives a restart.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use recall_memory::{Config, OpenAiEmbedder, SessionMemoryStore};
//!
//! let config = Config::from_env()?;
//! let embedder = Arc::new(OpenAiEmbedder::from_config(&config)?);
//! let store = SessionMemoryStore::from_config(&config, embedder)?;
//!
//! store.add_message("user123", "I like cats").await?;
//! let history = store.get_messages("user123").await;
//! let context = store.semantic_context("user123", "pets?", 5).await?;
//! ```

pub mod client;
pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod memory;
pub mod message;
pub mod retrieval;
pub mod storage;

pub use client::MemoryClient;
pub use config::Config;
pub use embedding::{Embedder, OpenAiEmbedder};
pub use error::{Error, Result};
pub use memory::{SessionMemoryStore, StoreStats};
pub use message::MessageRecord;
pub use retrieval::RetrievedMessage;
pub use storage::{FlatIndex, Neighbor, VectorIndex};

#[cfg(feature = "local-embeddings")]
pub use embedding::FastEmbedder;
