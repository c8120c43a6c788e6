//! Vector storage backends
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Chunk: the original text and metadata
//! - Embedding: the vector representation
//!
//! Items live in named collections. Similarity is cosine similarity, used for
//! both ranking and scores; all vectors in one collection share a dimension.
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_lib::store::{MemoryStore, VectorStore};
//!
//! let store = MemoryStore::new();
//! let collection = store.get_or_create_collection("pdf_chunks");
//!
//! // Insert chunks with their embeddings
//! collection.insert(&chunks, &embeddings)?;
//!
//! // Search by vector similarity
//! let results = collection.search(&query_embedding, 5)?;
//! ```

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::Result;

/// A search result with similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query, -1.0 to 1.0 (higher is more similar)
    pub score: f32,
}

impl SearchResult {
    /// Cosine distance, `1 - score`
    #[must_use]
    pub fn distance(&self) -> f32 {
        1.0 - self.score
    }
}

/// Trait for vector storage backends
///
/// Methods take `&self`; implementations synchronize internally so a handle
/// can be shared between threads.
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings
    ///
    /// # Arguments
    /// * `chunks` - The text chunks to store
    /// * `embeddings` - Corresponding embeddings (must be same length)
    ///
    /// Fails with `InvalidArgument` on a length mismatch, a dimension mismatch,
    /// or an id that is repeated or already stored. A failed insert stores
    /// nothing.
    fn insert(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// Search for similar chunks
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector
    /// * `k` - Maximum number of results to return
    ///
    /// # Returns
    /// Top-k results sorted by similarity (highest first), ties in insertion
    /// order. Empty if nothing is stored.
    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<SearchResult>>;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored data
    fn clear(&self);
}

mod memory;

pub use memory::*;
