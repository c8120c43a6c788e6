use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// In-memory registry of named collections.
///
/// Cloning the store is cheap and clones share the same collections. Nothing
/// is persisted; contents live as long as the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the collection called `name`, creating it on first use.
    ///
    /// Every call with the same name hands out a handle to the same storage.
    pub fn get_or_create_collection(&self, name: &str) -> Collection {
        if let Some(existing) = self.collections.read().get(name) {
            return existing.clone();
        }

        self.collections
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(collection = name, "created collection");
                Collection::new(name)
            })
            .clone()
    }
}

/// Handle to one named collection.
///
/// Brute-force cosine similarity search, suitable for the few thousand chunks
/// a handful of PDFs produce. Inserts take the write lock, searches the read
/// lock.
#[derive(Clone)]
pub struct Collection {
    name: Arc<str>,
    entries: Arc<RwLock<Entries>>,
}

#[derive(Default)]
struct Entries {
    ids: HashSet<String>,
    /// insertion order
    items: Vec<Entry>,
    dimension: Option<usize>,
}

struct Entry {
    chunk: Chunk,
    embedding: Embedding,
    norm: f32,
}

impl Collection {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            entries: Arc::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension fixed by the first insert, if any.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.entries.read().dimension
    }

    /// Whether both handles refer to the same storage.
    #[must_use]
    pub fn same_as(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Entries {
    fn validate(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<Option<usize>> {
        if chunks.len() != embeddings.len() {
            return Err(Error::InvalidArgument(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut dimension = self.dimension;
        let mut batch_ids = HashSet::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            if embedding.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "empty embedding for chunk '{}'",
                    chunk.id
                )));
            }
            match dimension {
                Some(d) if d != embedding.len() => {
                    return Err(Error::InvalidArgument(format!(
                        "embedding for chunk '{}' has dimension {}, expected {d}",
                        chunk.id,
                        embedding.len()
                    )));
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
            if self.ids.contains(&chunk.id) || !batch_ids.insert(chunk.id.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate chunk id '{}'",
                    chunk.id
                )));
            }
        }
        Ok(dimension)
    }
}

impl VectorStore for Collection {
    fn insert(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        let mut entries = self.entries.write();
        let dimension = entries.validate(chunks, embeddings)?;

        entries.dimension = dimension;
        entries.items.reserve(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            entries.ids.insert(chunk.id.clone());
            entries.items.push(Entry {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
                norm: norm(embedding),
            });
        }
        debug!(collection = %self.name, added = chunks.len(), total = entries.items.len(), "inserted");
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read();
        if k == 0 || entries.items.is_empty() {
            return Ok(Vec::new());
        }
        if entries.dimension != Some(query.len()) {
            return Err(Error::InvalidArgument(format!(
                "query has dimension {}, collection '{}' holds {}",
                query.len(),
                self.name,
                entries.dimension.unwrap_or_default()
            )));
        }

        let query_norm = norm(query);
        let mut scored: Vec<(usize, f32)> = entries
            .items
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, query_norm, &entry.embedding, entry.norm)))
            .collect();
        // stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| SearchResult {
                chunk: entries.items[i].chunk.clone(),
                score,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.read().items.len()
    }

    fn clear(&self) {
        let mut entries = self.entries.write();
        entries.ids.clear();
        entries.items.clear();
        entries.dimension = None;
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors with precomputed norms.
///
/// Returns a value in [-1, 1] where 1 means identical direction, and 0 when
/// either vector is all zeros.
fn cosine_similarity(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}
