//! Exact nearest-neighbor vector storage
//!
//! [`FlatIndex`] keeps every vector in one contiguous buffer and answers
//! queries with an exhaustive squared-L2 scan. That is only reasonable while
//! the collection stays in the hundreds to low thousands of entries; the
//! [`VectorIndex`] trait exists so a tree or graph index can replace it
//! without touching the session store.

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A single search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position assigned to the entry when it was inserted
    pub sequence_index: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Append-only vector collection with k-nearest-neighbor search
pub trait VectorIndex<M>: Send + Sync {
    /// Fixed dimension every vector must have
    fn dimensions(&self) -> usize;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a vector with its metadata and return its sequence index
    fn insert(&mut self, vector: Vec<f32>, metadata: M) -> Result<usize>;

    /// Return the `min(k, len)` closest entries, nearest first.
    ///
    /// Ties are broken by sequence index so repeated searches over the same
    /// state return identical results.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Metadata supplied with the entry at `sequence_index`
    fn metadata_at(&self, sequence_index: usize) -> Result<&M>;

    /// Drop every entry
    fn clear(&mut self);
}

/// Brute-force index over a flat `f32` buffer
#[derive(Debug, Clone)]
pub struct FlatIndex<M> {
    dimensions: usize,
    vectors: Vec<f32>,
    metadata: Vec<M>,
}

impl<M> FlatIndex<M> {
    /// Create an empty index for vectors of `dimensions` components
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
            metadata: Vec::new(),
        }
    }

    fn check_dimensions(&self, actual: usize) -> Result<()> {
        if actual != self.dimensions {
            return Err(Error::dimension_mismatch(self.dimensions, actual));
        }
        Ok(())
    }

    fn vector_at(&self, sequence_index: usize) -> &[f32] {
        let start = sequence_index * self.dimensions;
        &self.vectors[start..start + self.dimensions]
    }
}

impl<M: Send + Sync> VectorIndex<M> for FlatIndex<M> {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.metadata.len()
    }

    fn insert(&mut self, vector: Vec<f32>, metadata: M) -> Result<usize> {
        self.check_dimensions(vector.len())?;

        let sequence_index = self.metadata.len();
        self.vectors.extend_from_slice(&vector);
        self.metadata.push(metadata);

        Ok(sequence_index)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimensions(query.len())?;

        if k == 0 || self.metadata.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = (0..self.metadata.len())
            .map(|sequence_index| Neighbor {
                sequence_index,
                distance: squared_l2(query, self.vector_at(sequence_index)),
            })
            .collect();

        let k = k.min(neighbors.len());
        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, compare_neighbors);
            neighbors.truncate(k);
        }
        neighbors.sort_unstable_by(compare_neighbors);

        Ok(neighbors)
    }

    fn metadata_at(&self, sequence_index: usize) -> Result<&M> {
        self.metadata.get(sequence_index).ok_or(Error::IndexOutOfRange {
            index: sequence_index,
            len: self.metadata.len(),
        })
    }

    fn clear(&mut self) {
        self.vectors.clear();
        self.metadata.clear();
    }
}

/// Squared Euclidean distance between two equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.sequence_index.cmp(&b.sequence_index))
}
