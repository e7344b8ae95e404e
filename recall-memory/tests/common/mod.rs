//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use recall_memory::{Embedder, Error, Result, SessionMemoryStore};

/// Texts containing this marker make [`KeywordEmbedder`] fail
pub const FAIL_MARKER: &str = "<unreachable>";

const ANIMALS: &[&str] = &["cat", "cats", "dog", "dogs", "pet", "pets", "kitten", "puppy"];
const FINANCE: &[&str] = &["stock", "stocks", "market", "fell", "shares", "price"];

/// Deterministic embedder placing texts on topic axes by keyword.
///
/// Axis 0 counts animal words, axis 1 finance words, axis 2 everything
/// else, and axis 3 is a constant bias.
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub const DIMENSIONS: usize = 4;

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut v = vec![0.0, 0.0, 0.0, 1.0];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if ANIMALS.contains(&word.as_str()) {
                v[0] += 1.0;
            } else if FINANCE.contains(&word.as_str()) {
                v[1] += 1.0;
            } else {
                v[2] += 0.1;
            }
        }
        v
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let other tasks run, as a network call would
        tokio::task::yield_now().await;

        if text.contains(FAIL_MARKER) {
            return Err(Error::embedding("embedding service timed out"));
        }
        Ok(Self::vector_for(text))
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Embedder returning vectors of the wrong length
pub struct WrongSizeEmbedder;

#[async_trait]
impl Embedder for WrongSizeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; KeywordEmbedder::DIMENSIONS + 1])
    }

    fn dimensions(&self) -> usize {
        KeywordEmbedder::DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "wrong-size"
    }
}

pub fn keyword_store() -> (Arc<KeywordEmbedder>, SessionMemoryStore) {
    let embedder = KeywordEmbedder::new();
    let store = SessionMemoryStore::new(embedder.clone());
    (embedder, store)
}
