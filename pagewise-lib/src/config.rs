//! Runtime configuration
//!
//! Every field has a default, so an empty TOML file (or no file at all) gives
//! the stock settings: 1000-character chunks with 200 characters of overlap,
//! five retrieved chunks per question, OpenAI embedding and generation models.
//!
//! ```toml
//! chunk_size = 800
//! overlap = 100
//! top_k = 3
//! strategy = "window"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Collection name used when none is configured.
pub const DEFAULT_COLLECTION: &str = "pdf_chunks";

/// Remote embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// How page text is cut into chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Word-wrap into segments and join each segment with its predecessor
    #[default]
    Wrap,
    /// Exact sliding character window
    Window,
}

impl std::str::FromStr for ChunkStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" => Ok(Self::Wrap),
            "window" => Ok(Self::Window),
            other => Err(Error::InvalidConfig(format!(
                "unknown chunk strategy '{other}'; use wrap or window"
            ))),
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Character budget per chunk
    pub chunk_size: usize,
    /// Characters reserved for overlap with the previous chunk
    pub overlap: usize,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    pub strategy: ChunkStrategy,
    pub embedding_model: String,
    pub generation_model: String,
    /// Name of the vector collection documents are added to
    pub collection: String,
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,
    /// Timeout applied to every remote call
    pub timeout_secs: u64,
    /// Maximum texts per embedding request
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            top_k: 5,
            strategy: ChunkStrategy::Wrap,
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            generation_model: "gpt-4o-mini".into(),
            collection: DEFAULT_COLLECTION.into(),
            api_base: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
            batch_size: 64,
        }
    }
}

impl Config {
    /// Load config from a TOML file and validate it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeout_secs must be positive".into()));
        }
        for (field, value) in [
            ("embedding_model", &self.embedding_model),
            ("generation_model", &self.generation_model),
            ("collection", &self.collection),
            ("api_base", &self.api_base),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.overlap, 200);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.collection, "pdf_chunks");
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let config = Config {
            chunk_size: 100,
            overlap: 100,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_model_rejected() {
        let config = Config {
            embedding_model: "  ".into(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = 500\noverlap = 50\nstrategy = \"window\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.overlap, 50);
        assert_eq!(config.strategy, ChunkStrategy::Window);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = 100\noverlap = 300").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("WRAP".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Wrap);
        assert_eq!("window".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Window);
        assert!("sentences".parse::<ChunkStrategy>().is_err());
    }
}
