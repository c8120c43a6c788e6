use crate::chunk::{check_sizes, Chunker, PageChunks};
use crate::Result;

/// Sliding-window chunker - splits by character count
///
/// Good for: baseline experiments, exact overlap
///
/// Each window is `chunk_size` characters and starts `chunk_size - overlap`
/// characters after the previous one, so neighbours share exactly `overlap`
/// characters. Windows may cut words in half.
#[derive(Debug, Clone)]
pub struct WindowChunker {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl WindowChunker {
    /// Fails with `InvalidConfig` unless `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        check_sizes(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for WindowChunker {
    fn name(&self) -> &str {
        "window"
    }

    fn split(&self, text: String) -> PageChunks {
        let windows = Windows {
            text,
            start: Some(0),
            size: self.chunk_size,
            stride: self.chunk_size - self.overlap,
        };
        Box::new(windows.filter(|w| !w.trim().is_empty()))
    }
}

struct Windows {
    text: String,
    start: Option<usize>,
    size: usize,
    stride: usize,
}

impl Windows {
    /// Byte offset `n` chars after `from`, clamped to the end of the text.
    fn advance(&self, from: usize, n: usize) -> usize {
        self.text[from..]
            .char_indices()
            .nth(n)
            .map_or(self.text.len(), |(i, _)| from + i)
    }
}

impl Iterator for Windows {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.start?;
        if start >= self.text.len() {
            self.start = None;
            return None;
        }

        let end = self.advance(start, self.size);
        // the window that reaches the end of the page is the last one
        self.start = (end < self.text.len()).then(|| self.advance(start, self.stride));
        Some(self.text[start..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(chunker: &WindowChunker, text: &str) -> Vec<String> {
        chunker.split(text.to_string()).collect()
    }

    #[test]
    fn test_basic_chunking() {
        let chunker = WindowChunker::new(10, 0).unwrap();
        let content = "0123456789abcdefghij"; // 20 chars
        assert_eq!(chunks(&chunker, content), ["0123456789", "abcdefghij"]);
    }

    #[test]
    fn test_overlap() {
        let chunker = WindowChunker::new(10, 5).unwrap();
        let content = "0123456789abcdefghij"; // 20 chars, stride=5

        // stops once a window reaches the end
        assert_eq!(
            chunks(&chunker, content),
            ["0123456789", "56789abcde", "abcdefghij"]
        );
    }

    #[test]
    fn test_trailing_partial_window() {
        let chunker = WindowChunker::new(10, 2).unwrap();
        let content = "0123456789abcdef"; // 16 chars, stride=8
        assert_eq!(chunks(&chunker, content), ["0123456789", "89abcdef"]);
    }

    #[test]
    fn test_unicode_safety() {
        let chunker = WindowChunker::new(5, 1).unwrap();
        let content = "Hello 👋 World"; // emoji is 4 bytes

        let out = chunks(&chunker, content);
        assert_eq!(out, ["Hello", "o 👋 W", "World"]);
    }

    #[test]
    fn test_empty_content() {
        let chunker = WindowChunker::new(10, 0).unwrap();
        assert!(chunks(&chunker, "").is_empty());
        assert!(chunks(&chunker, "          \n").is_empty());
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(WindowChunker::new(10, 10).is_err());
        assert!(WindowChunker::new(10, 11).is_err());
    }
}
