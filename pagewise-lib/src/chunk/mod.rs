//! Document chunking strategies
//!
//! Pages are chunked independently; no chunk spans a page break.
//! - [`WrapChunker`]: word-wrap the page into segments of at most
//!   `chunk_size - overlap` characters, then join every segment with its
//!   predecessor. Overlap is a whole segment, so its exact length follows
//!   word boundaries rather than a character count.
//! - [`WindowChunker`]: exact sliding window of `chunk_size` characters
//!   advancing by `chunk_size - overlap`.
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_lib::chunk::{DocumentChunks, WrapChunker};
//!
//! let chunker = WrapChunker::new(1000, 200)?;
//! let pages = extractor.pages(path)?;
//! for chunk in DocumentChunks::new(&chunker, pages, "doc-1") {
//!     let chunk = chunk?;
//!     println!("{}: {}", chunk.id, chunk.content);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ChunkStrategy, Config};
use crate::extract::Pages;
use crate::{Error, Result};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Unique identifier for this chunk
    pub id: String,
    /// The text content of this chunk
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document identifier
    pub source_id: Option<String>,
    /// Page the chunk was cut from (0-indexed)
    pub page: usize,
    /// Position within the source document (0-indexed)
    pub position: usize,
}

/// Lazy sequence of chunk strings for one page
pub type PageChunks = Box<dyn Iterator<Item = String>>;

/// Trait for page chunking strategies
pub trait Chunker: Send + Sync {
    /// Split one page's text into chunk strings, in order.
    ///
    /// A page with no text yields nothing.
    fn split(&self, text: String) -> PageChunks;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

/// Build the chunker selected by `config`.
pub fn from_config(config: &Config) -> Result<Box<dyn Chunker>> {
    Ok(match config.strategy {
        ChunkStrategy::Wrap => Box::new(WrapChunker::new(config.chunk_size, config.overlap)?),
        ChunkStrategy::Window => Box::new(WindowChunker::new(config.chunk_size, config.overlap)?),
    })
}

pub(crate) fn check_sizes(chunk_size: usize, overlap: usize) -> Result<usize> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(Error::InvalidConfig(format!(
            "need 0 <= overlap < chunk_size, got chunk_size={chunk_size} overlap={overlap}"
        )));
    }
    Ok(chunk_size - overlap)
}

/// Chunks of a whole document, produced page by page as they are pulled.
///
/// Chunk ids are `{document_id}-{position}` with `position` counting across
/// all pages. A page extraction error is yielded once and ends the stream.
pub struct DocumentChunks<'c> {
    chunker: &'c dyn Chunker,
    pages: Pages,
    document_id: String,
    current: Option<(usize, PageChunks)>,
    position: usize,
    pages_read: usize,
    done: bool,
}

impl<'c> DocumentChunks<'c> {
    pub fn new(chunker: &'c dyn Chunker, pages: Pages, document_id: impl Into<String>) -> Self {
        Self {
            chunker,
            pages,
            document_id: document_id.into(),
            current: None,
            position: 0,
            pages_read: 0,
            done: false,
        }
    }

    /// Number of pages consumed so far
    #[must_use]
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }
}

impl Iterator for DocumentChunks<'_> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some((page, chunks)) = &mut self.current {
                if let Some(content) = chunks.next() {
                    let position = self.position;
                    self.position += 1;
                    return Some(Ok(Chunk {
                        id: format!("{}-{position}", self.document_id),
                        content,
                        metadata: ChunkMetadata {
                            source_id: Some(self.document_id.clone()),
                            page: *page,
                            position,
                        },
                    }));
                }
                self.current = None;
            }

            match self.pages.next() {
                Some(Ok(page)) => {
                    self.pages_read += 1;
                    self.current = Some((page.index, self.chunker.split(page.text)));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

mod window;
mod wrap;

pub use window::*;
pub use wrap::*;
