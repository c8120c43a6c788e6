use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::config::{Config, DEFAULT_EMBEDDING_MODEL};
use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// An ONNX model fastembed can run, with the instruction prefixes it was
/// trained with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModel {
    pub code: &'static str,
    pub model: EmbeddingModel,
    pub query_prefix: &'static str,
    pub document_prefix: &'static str,
}

const BGE_QUERY: &str = "Represent this sentence for searching relevant passages: ";

impl LocalModel {
    /// Map a configured model name to a local model.
    ///
    /// The remote default resolves to BGE-small so `--local-embeddings` works
    /// without also naming a model. Matching ignores ASCII case.
    pub fn resolve(name: &str) -> Result<Self> {
        let name = name.trim();
        if name == DEFAULT_EMBEDDING_MODEL {
            return Self::resolve("BAAI/bge-small-en-v1.5");
        }

        let lowered = name.to_ascii_lowercase();
        let (code, model, query_prefix, document_prefix) = match lowered.as_str() {
            "baai/bge-small-en-v1.5" => (
                "BAAI/bge-small-en-v1.5",
                EmbeddingModel::BGESmallENV15,
                BGE_QUERY,
                "",
            ),
            "baai/bge-base-en-v1.5" => (
                "BAAI/bge-base-en-v1.5",
                EmbeddingModel::BGEBaseENV15,
                BGE_QUERY,
                "",
            ),
            "baai/bge-large-en-v1.5" => (
                "BAAI/bge-large-en-v1.5",
                EmbeddingModel::BGELargeENV15,
                BGE_QUERY,
                "",
            ),
            "sentence-transformers/all-minilm-l6-v2" => (
                "sentence-transformers/all-MiniLM-L6-v2",
                EmbeddingModel::AllMiniLML6V2,
                "",
                "",
            ),
            "intfloat/multilingual-e5-small" => (
                "intfloat/multilingual-e5-small",
                EmbeddingModel::MultilingualE5Small,
                "query: ",
                "passage: ",
            ),
            "nomic-ai/nomic-embed-text-v1.5" => (
                "nomic-ai/nomic-embed-text-v1.5",
                EmbeddingModel::NomicEmbedTextV15,
                "search_query: ",
                "search_document: ",
            ),
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "embedding_model '{name}' is not available locally"
                )))
            }
        };

        Ok(Self {
            code,
            model,
            query_prefix,
            document_prefix,
        })
    }
}

/// Embedder running a fastembed model in-process.
///
/// Indexing works without an API key. Vector sizes differ from the remote
/// models, so a collection must be filled and queried by the same embedder.
pub struct LocalEmbedder {
    local: LocalModel,
    model: TextEmbedding,
}

impl LocalEmbedder {
    /// Load the model named by `config.embedding_model`.
    ///
    /// Downloads the weights on first use.
    pub fn new(config: &Config) -> Result<Self> {
        let local = LocalModel::resolve(&config.embedding_model)?;
        info!(model = local.code, "loading local embedding model");

        let opts = InitOptions::new(local.model.clone()).with_show_download_progress(true);
        let model = TextEmbedding::try_new(opts)
            .map_err(|e| Error::embedding(format!("failed to load {}: {e}", local.code)))?;
        Ok(Self { local, model })
    }
}

impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        self.local.code
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let result = if self.local.document_prefix.is_empty() {
            self.model.embed(texts, None)
        } else {
            let prefixed: Vec<String> = texts
                .iter()
                .map(|text| format!("{}{text}", self.local.document_prefix))
                .collect();
            self.model.embed(prefixed, None)
        };
        result.map_err(|e| Error::embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        let query = format!("{}{text}", self.local.query_prefix);
        self.model
            .embed(vec![query], None)
            .map_err(|e| Error::embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("model returned no embeddings"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_default_maps_to_bge_small() {
        let model = LocalModel::resolve(DEFAULT_EMBEDDING_MODEL).unwrap();
        assert_eq!(model.model, EmbeddingModel::BGESmallENV15);
        assert_eq!(model.code, "BAAI/bge-small-en-v1.5");
        assert_eq!(model.query_prefix, BGE_QUERY);
    }

    #[test]
    fn test_model_codes_ignore_case() {
        let model = LocalModel::resolve("baai/BGE-Base-EN-v1.5").unwrap();
        assert_eq!(model.model, EmbeddingModel::BGEBaseENV15);

        let e5 = LocalModel::resolve("intfloat/multilingual-e5-small").unwrap();
        assert_eq!(e5.document_prefix, "passage: ");
    }

    #[test]
    fn test_unknown_model_is_invalid_config() {
        let err = LocalModel::resolve("text-embedding-3-large").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("text-embedding-3-large")));
    }
}
