//! Session-scoped retrieval over a shared vector index
//!
//! The index knows nothing about sessions, so a query asks it for more
//! neighbors than the caller wants and filters afterwards. Asking for only
//! `top_k` globally would starve a session whenever other sessions own the
//! nearest vectors.

use crate::error::Result;
use crate::message::MessageRecord;
use crate::storage::{Neighbor, VectorIndex};

/// Number of neighbors to request from the index before session filtering.
///
/// Always the whole collection (or `top_k` if larger), which keeps results
/// exact at the cost of a full scan.
pub fn over_fetch_k(top_k: usize, total_entries: usize) -> usize {
    top_k.max(total_entries)
}

/// A message retrieved for a session together with its distance
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedMessage {
    pub sequence_index: usize,
    pub text: String,
    pub distance: f32,
}

/// Nearest messages belonging to `session_id`, nearest first
pub fn session_neighbors<I>(
    index: &I,
    query: &[f32],
    session_id: &str,
    top_k: usize,
) -> Result<Vec<RetrievedMessage>>
where
    I: VectorIndex<MessageRecord> + ?Sized,
{
    if top_k == 0 || index.is_empty() {
        return Ok(Vec::new());
    }

    let k = over_fetch_k(top_k, index.len());
    let neighbors = index.search(query, k)?;

    let mut results = Vec::with_capacity(top_k.min(index.len()));
    for Neighbor {
        sequence_index,
        distance,
    } in neighbors
    {
        let record = index.metadata_at(sequence_index)?;
        if !record.belongs_to(session_id) {
            continue;
        }
        results.push(RetrievedMessage {
            sequence_index,
            text: record.text.clone(),
            distance,
        });
        if results.len() == top_k {
            break;
        }
    }

    Ok(results)
}
