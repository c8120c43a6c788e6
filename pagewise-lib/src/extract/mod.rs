//! Page text extraction
//!
//! Extractors turn a document path into a forward-only stream of pages, so a
//! large document never has to be held in memory as text all at once.
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_lib::extract::{PdfExtractor, TextExtractor};
//!
//! for page in PdfExtractor.pages(Path::new("report.pdf"))? {
//!     let page = page?;
//!     println!("page {}: {} chars", page.index, page.text.len());
//! }
//! ```

use std::path::Path;

use crate::Result;

/// Text of a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 0-indexed page number
    pub index: usize,
    /// Raw extracted text
    pub text: String,
}

/// Lazy, non-restartable page stream in ascending page order
pub type Pages = Box<dyn Iterator<Item = Result<Page>>>;

/// Trait for document text extractors
pub trait TextExtractor {
    /// Open a document and stream its pages.
    ///
    /// Fails with `NotFound` if the path is not a readable file and with
    /// `CorruptDocument` if it cannot be parsed.
    fn pages(&self, path: &Path) -> Result<Pages>;
}

mod pdf;

pub use pdf::*;
