//! Pagewise - retrieval-augmented question answering over PDF documents
//!
//! # Architecture
//!
//! ```text
//! PDF -> Extractor -> Chunker -> Embedder -> Collection
//!                                               |
//! Question -> Embedder -> Search <--------------+
//!                           |
//!                  Prompt -> Answerer -> Answer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagewise_lib::{
//!     answer::OpenAiAnswerer, config::Config, embed::OpenAiEmbedder,
//!     extract::PdfExtractor, pipeline::Pipeline, store::MemoryStore,
//! };
//!
//! let config = Config::default();
//! let store = MemoryStore::new();
//! let collection = store.get_or_create_collection(&config.collection);
//! let embedder = OpenAiEmbedder::new(&api_key, &config)?;
//! let answerer = OpenAiAnswerer::new(&api_key, &config)?;
//! let mut pipeline = Pipeline::new(PdfExtractor, embedder, answerer, collection, &config)?;
//!
//! // Index a document
//! pipeline.ingest(Path::new("handbook.pdf"))?;
//!
//! // Ask
//! let answer = pipeline.ask("How many vacation days do I get?")?;
//! println!("{}", answer.text);
//! ```

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod session;
pub mod store;

pub use error::{Error, Result};
