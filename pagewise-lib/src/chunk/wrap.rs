use crate::chunk::{check_sizes, Chunker, PageChunks};
use crate::Result;

/// Word-wrap chunker - joins each wrapped segment with the one before it
///
/// Good for: prose, where cutting mid-word hurts embedding quality
///
/// Segments are at most `chunk_size - overlap` characters, so a chunk made of
/// two segments stays within `chunk_size` plus the joining space.
#[derive(Debug, Clone)]
pub struct WrapChunker {
    width: usize,
}

impl WrapChunker {
    /// Fails with `InvalidConfig` unless `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let width = check_sizes(chunk_size, overlap)?;
        Ok(Self { width })
    }

    /// Maximum segment length in characters
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl Chunker for WrapChunker {
    fn name(&self) -> &str {
        "wrap"
    }

    fn split(&self, text: String) -> PageChunks {
        Box::new(Overlapping {
            segments: Segments::new(text, self.width),
            previous: None,
        })
    }
}

struct Overlapping {
    segments: Segments,
    previous: Option<String>,
}

impl Iterator for Overlapping {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.segments.next()?;
        let chunk = match self.previous.take() {
            Some(previous) => format!("{previous} {segment}"),
            None => segment.clone(),
        };
        self.previous = Some(segment);
        Some(chunk)
    }
}

/// Greedy word wrap over owned text.
///
/// Whitespace runs collapse to a single space. A word longer than `width`
/// becomes a segment of its own instead of being broken.
pub struct Segments {
    text: String,
    pos: usize,
    width: usize,
}

impl Segments {
    #[must_use]
    pub fn new(text: String, width: usize) -> Self {
        Self { text, pos: 0, width }
    }

    /// Byte range of the next word at or after `from`.
    fn word_at(&self, from: usize) -> Option<(usize, usize)> {
        let rest = &self.text[from..];
        let start = from + rest.find(|c: char| !c.is_whitespace())?;
        let end = self.text[start..]
            .find(char::is_whitespace)
            .map_or(self.text.len(), |i| start + i);
        Some((start, end))
    }
}

impl Iterator for Segments {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, end) = self.word_at(self.pos)?;
        let mut line = self.text[start..end].to_string();
        let mut chars = line.chars().count();
        self.pos = end;

        while let Some((start, end)) = self.word_at(self.pos) {
            let word = &self.text[start..end];
            let len = word.chars().count();
            if chars + 1 + len > self.width {
                break;
            }
            line.push(' ');
            line.push_str(word);
            chars += 1 + len;
            self.pos = end;
        }

        Some(line)
    }
}
