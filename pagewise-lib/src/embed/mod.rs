//! Text embedding
//!
//! The [`Embedder`] trait is the boundary to whatever turns text into vectors:
//! a remote OpenAI-compatible service by default, or a local ONNX model with
//! the `local-embed` feature.
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_lib::embed::{embed_batched, OpenAiEmbedder};
//!
//! let mut embedder = OpenAiEmbedder::new(api_key, &config)?;
//!
//! // Embed documents (for indexing), 64 texts per request
//! let doc_embeddings = embed_batched(&mut embedder, &texts, 64)?;
//!
//! // Embed query (for searching)
//! let query_embedding = embedder.embed_query("What does the warranty cover?")?;
//! ```

use tracing::debug;

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Must return exactly one embedding per input, in input order.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Note: Some models (like BGE) use different prompts for queries vs documents.
    /// This method handles that distinction.
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Embed `texts` in requests of at most `batch_size` inputs.
///
/// The result lines up with `texts` position by position. A batch that comes
/// back with the wrong number of vectors fails the whole call; nothing is
/// retried.
pub fn embed_batched<E: Embedder + ?Sized>(
    embedder: &mut E,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<Embedding>> {
    if batch_size == 0 {
        return Err(Error::InvalidConfig("batch_size must be positive".into()));
    }

    let mut embeddings = Vec::with_capacity(texts.len());
    for (i, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = embedder.embed_documents(batch)?;
        if vectors.len() != batch.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} inputs",
                embedder.model_name(),
                vectors.len(),
                batch.len()
            )));
        }
        debug!(batch = i, size = batch.len(), "embedded batch");
        embeddings.extend(vectors);
    }
    Ok(embeddings)
}

#[cfg(feature = "local-embed")]
mod local;
mod openai;

#[cfg(feature = "local-embed")]
pub use local::*;
pub use openai::*;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic embedder: letter frequencies a-z, plus call accounting.
    #[derive(Default)]
    pub(crate) struct LetterEmbedder {
        pub calls: Vec<usize>,
        pub fail: bool,
        pub drop_last: bool,
    }

    pub(crate) fn letters(text: &str) -> Embedding {
        let mut v = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        v
    }

    impl Embedder for LetterEmbedder {
        fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
            if self.fail {
                return Err(Error::embedding("service unavailable"));
            }
            self.calls.push(texts.len());
            let mut out: Vec<Embedding> = texts.iter().map(|t| letters(t)).collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }

        fn embed_query(&mut self, text: &str) -> Result<Embedding> {
            if self.fail {
                return Err(Error::embedding("service unavailable"));
            }
            Ok(letters(text))
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }

    #[test]
    fn test_batches_preserve_order() {
        let mut embedder = LetterEmbedder::default();
        let texts = ["a", "bb", "ccc", "dddd", "eeeee"];

        let out = embed_batched(&mut embedder, &texts, 2).unwrap();

        assert_eq!(embedder.calls, [2, 2, 1]);
        assert_eq!(out.len(), texts.len());
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(out[i], letters(text));
        }
    }

    #[test]
    fn test_empty_input_makes_no_calls() {
        let mut embedder = LetterEmbedder::default();
        let out = embed_batched(&mut embedder, &[], 8).unwrap();
        assert!(out.is_empty());
        assert!(embedder.calls.is_empty());
    }

    #[test]
    fn test_short_batch_is_error() {
        let mut embedder = LetterEmbedder {
            drop_last: true,
            ..Default::default()
        };
        let result = embed_batched(&mut embedder, &["a", "b"], 8);
        assert!(matches!(result, Err(Error::EmbeddingService { .. })));
    }

    #[test]
    fn test_service_failure_propagates() {
        let mut embedder = LetterEmbedder {
            fail: true,
            ..Default::default()
        };
        let result = embed_batched(&mut embedder, &["a"], 8);
        assert!(matches!(result, Err(Error::EmbeddingService { .. })));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut embedder = LetterEmbedder::default();
        let result = embed_batched(&mut embedder, &["a"], 0);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
