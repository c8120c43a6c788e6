//! Ingest and question-answering pipeline
//!
//! Combines extractor, chunker, embedder, collection and answerer.
//!
//! ```text
//! ingest: path -> pages -> chunks -> embeddings -> collection
//! ask:    question -> embedding -> top-k chunks -> prompt -> answer
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_lib::pipeline::Pipeline;
//!
//! let store = MemoryStore::new();
//! let collection = store.get_or_create_collection(&config.collection);
//! let mut pipeline = Pipeline::new(PdfExtractor, embedder, answerer, collection, &config)?;
//!
//! pipeline.ingest(Path::new("manual.pdf"))?;
//! let answer = pipeline.ask("How do I reset the device?")?;
//! println!("{}", answer.text);
//! ```

use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use crate::answer::{build_prompt, render_context, Answerer};
use crate::chunk::{self, Chunk, Chunker, DocumentChunks};
use crate::config::Config;
use crate::embed::{embed_batched, Embedder, Embedding};
use crate::extract::TextExtractor;
use crate::store::{Collection, SearchResult, VectorStore};
use crate::Result;

/// Summary of one ingested document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Id prefix shared by every chunk of the document
    pub document_id: String,
    pub pages: usize,
    pub chunks: usize,
}

/// A generated answer with the chunks it was grounded on
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Retrieved chunks, most similar first
    pub sources: Vec<SearchResult>,
}

/// Retrieval-augmented question answering over one collection.
pub struct Pipeline<X: TextExtractor, E: Embedder, A: Answerer> {
    extractor: X,
    embedder: E,
    answerer: A,
    chunker: Box<dyn Chunker>,
    collection: Collection,
    top_k: usize,
    batch_size: usize,
}

impl<X: TextExtractor, E: Embedder, A: Answerer> Pipeline<X, E, A> {
    /// Create a pipeline writing to and reading from `collection`.
    ///
    /// Fails with `InvalidConfig` if `config` does not validate.
    pub fn new(
        extractor: X,
        embedder: E,
        answerer: A,
        collection: Collection,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor,
            embedder,
            answerer,
            chunker: chunk::from_config(config)?,
            collection,
            top_k: config.top_k,
            batch_size: config.batch_size,
        })
    }

    /// Extract, chunk, embed and store a document.
    ///
    /// Chunks are embedded batch by batch as pages are read, then inserted in
    /// one call. On any error the collection is left untouched.
    pub fn ingest(&mut self, path: &Path) -> Result<IngestReport> {
        let document_id = Uuid::new_v4().simple().to_string();
        let pages = self.extractor.pages(path)?;
        let mut stream = DocumentChunks::new(self.chunker.as_ref(), pages, document_id.as_str());

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut embeddings: Vec<Embedding> = Vec::new();
        loop {
            let batch: Vec<Chunk> = stream
                .by_ref()
                .take(self.batch_size)
                .collect::<Result<_>>()?;
            if batch.is_empty() {
                break;
            }
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            embeddings.extend(embed_batched(&mut self.embedder, &texts, self.batch_size)?);
            chunks.extend(batch);
        }
        let pages = stream.pages_read();

        if !chunks.is_empty() {
            self.collection.insert(&chunks, &embeddings)?;
        }
        info!(
            path = %path.display(),
            document = %document_id,
            pages,
            chunks = chunks.len(),
            "ingested document"
        );

        Ok(IngestReport {
            document_id,
            pages,
            chunks: chunks.len(),
        })
    }

    /// Return the `top_k` chunks most similar to `question`.
    pub fn retrieve(&mut self, question: &str) -> Result<Vec<SearchResult>> {
        if self.collection.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed_query(question)?;
        let results = self.collection.search(&query, self.top_k)?;
        debug!(hits = results.len(), "retrieved context");
        Ok(results)
    }

    /// Answer `question` from the retrieved context.
    ///
    /// An empty collection still produces a prompt, just with no context.
    pub fn ask(&mut self, question: &str) -> Result<Answer> {
        let sources = self.retrieve(question)?;
        let context = render_context(sources.iter().map(|r| r.chunk.content.as_str()));
        let prompt = build_prompt(question, &context);
        let text = self.answerer.answer(&prompt)?;
        info!(sources = sources.len(), model = self.answerer.model_name(), "answered question");
        Ok(Answer { text, sources })
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Returns the collection this pipeline reads and writes.
    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the answerer.
    #[must_use]
    pub fn answerer(&self) -> &A {
        &self.answerer
    }
}
