//! Pagewise CLI - ask questions about PDF documents
//!
//! # Commands
//!
//! ```bash
//! # Interactive session (add_doc / questions / exit)
//! pagewise chat --doc handbook.pdf
//!
//! # Chunk a document and show results, no API calls
//! pagewise chunk --strategy window --size 500 --overlap 50 handbook.pdf
//!
//! # One-shot: index a file and ask it something
//! pagewise ask handbook.pdf "How many vacation days do I get?"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagewise_lib::{
    answer::{Answerer, OpenAiAnswerer},
    chunk::{self, DocumentChunks},
    config::{ChunkStrategy, Config},
    embed::{Embedder, OpenAiEmbedder},
    extract::{PdfExtractor, TextExtractor},
    pipeline::Pipeline,
    session::Session,
    store::MemoryStore,
    Error,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagewise")]
#[command(about = "Ask questions about PDF documents")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides applied on top of the config file
#[derive(Args)]
struct Settings {
    /// TOML config file
    #[arg(long, global = true, env = "PAGEWISE_CONFIG")]
    config: Option<PathBuf>,

    /// API key for the embedding and generation service (falls back to API_KEY)
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[arg(long, global = true)]
    embedding_model: Option<String>,

    #[arg(long, global = true)]
    generation_model: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    /// Chunking strategy: "wrap" or "window"
    #[arg(long, global = true)]
    strategy: Option<ChunkStrategy>,

    /// Chunk size in characters
    #[arg(long, global = true)]
    size: Option<usize>,

    /// Overlap in characters
    #[arg(long, global = true)]
    overlap: Option<usize>,

    /// Embed locally with fastembed instead of calling the API
    #[cfg(feature = "local-embed")]
    #[arg(long, global = true)]
    local_embeddings: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Chat {
        /// Documents to index before the first prompt
        #[arg(long = "doc")]
        docs: Vec<PathBuf>,
    },

    /// Chunk a document and print the chunks
    Chunk {
        /// PDF file to chunk
        input: PathBuf,
    },

    /// Index a document and answer one question about it
    Ask {
        /// PDF file to index
        input: PathBuf,

        /// Question to answer
        question: String,
    },
}

impl Settings {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::default(),
        };
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.embedding_model = model.clone();
        }
        if let Some(model) = &self.generation_model {
            config.generation_model = model.clone();
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(size) = self.size {
            config.chunk_size = size;
        }
        if let Some(overlap) = self.overlap {
            config.overlap = overlap;
        }
        config.validate()?;
        Ok(config)
    }

    fn api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .context("an API key is required: pass --api-key or set OPENAI_API_KEY")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr, keeping stdout for the session
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.settings.config()?;

    match cli.command.unwrap_or(Commands::Chat { docs: Vec::new() }) {
        Commands::Chunk { input } => print_chunks(&input, &config),
        Commands::Chat { docs } => {
            let api_key = cli.settings.api_key()?;
            let answerer = OpenAiAnswerer::new(&api_key, &config)?;
            #[cfg(feature = "local-embed")]
            if cli.settings.local_embeddings {
                let embedder = pagewise_lib::embed::LocalEmbedder::new(&config)?;
                return chat(embedder, answerer, &config, &docs);
            }
            let embedder = OpenAiEmbedder::new(&api_key, &config)?;
            chat(embedder, answerer, &config, &docs)
        }
        Commands::Ask { input, question } => {
            let api_key = cli.settings.api_key()?;
            let answerer = OpenAiAnswerer::new(&api_key, &config)?;
            #[cfg(feature = "local-embed")]
            if cli.settings.local_embeddings {
                let embedder = pagewise_lib::embed::LocalEmbedder::new(&config)?;
                return ask(embedder, answerer, &config, &input, &question);
            }
            let embedder = OpenAiEmbedder::new(&api_key, &config)?;
            ask(embedder, answerer, &config, &input, &question)
        }
    }
}

fn pipeline<E: Embedder, A: Answerer>(
    embedder: E,
    answerer: A,
    config: &Config,
) -> Result<Pipeline<PdfExtractor, E, A>> {
    let store = MemoryStore::new();
    let collection = store.get_or_create_collection(&config.collection);
    Ok(Pipeline::new(PdfExtractor, embedder, answerer, collection, config)?)
}

fn chat<E: Embedder, A: Answerer>(
    embedder: E,
    answerer: A,
    config: &Config,
    docs: &[PathBuf],
) -> Result<()> {
    let mut pipeline = pipeline(embedder, answerer, config)?;

    for doc in docs {
        match pipeline.ingest(doc) {
            Ok(report) => println!(
                "Added '{}': {} chunks from {} pages.",
                doc.display(),
                report.chunks,
                report.pages
            ),
            Err(Error::NotFound(_)) => println!("File '{}' not found. Pass.", doc.display()),
            Err(e) if e.is_recoverable() => warn!(error = %e, doc = %doc.display(), "skipped document"),
            Err(e) => return Err(e.into()),
        }
    }

    let stdin = io::stdin();
    Session::new(&mut pipeline).run(stdin.lock(), io::stdout().lock())?;
    Ok(())
}

fn ask<E: Embedder, A: Answerer>(
    embedder: E,
    answerer: A,
    config: &Config,
    input: &Path,
    question: &str,
) -> Result<()> {
    let mut pipeline = pipeline(embedder, answerer, config)?;

    let report = pipeline
        .ingest(input)
        .with_context(|| format!("failed to index '{}'", input.display()))?;
    println!(
        "Indexed {} chunks from {} pages into '{}'",
        report.chunks,
        report.pages,
        pipeline.collection().name()
    );

    let answer = pipeline.ask(question)?;
    println!("\n=== Answer ===\n\n{}\n", answer.text.trim_end());
    println!("=== Sources ===\n");
    for (i, result) in answer.sources.iter().enumerate() {
        let preview: String = result.chunk.content.chars().take(200).collect();
        let ellipsis = if result.chunk.content.chars().count() > 200 { "..." } else { "" };
        println!(
            "#{} page {} (score: {:.4})",
            i + 1,
            result.chunk.metadata.page + 1,
            result.score
        );
        println!("{preview}{ellipsis}\n");
    }
    Ok(())
}

fn print_chunks(input: &Path, config: &Config) -> Result<()> {
    let chunker = chunk::from_config(config)?;
    let pages = PdfExtractor.pages(input)?;

    println!(
        "Chunking '{}' with {} strategy (size {}, overlap {}):\n",
        input.display(),
        chunker.name(),
        config.chunk_size,
        config.overlap
    );
    let mut count = 0;
    for chunk in DocumentChunks::new(chunker.as_ref(), pages, "preview") {
        let chunk = chunk?;
        count += 1;
        let chars = chunk.content.chars().count();
        println!(
            "--- Chunk {} (page {}, {} chars) ---",
            count,
            chunk.metadata.page + 1,
            chars
        );
        // Show preview (first 200 chars)
        let preview: String = chunk.content.chars().take(200).collect();
        println!("{}{}\n", preview, if chars > 200 { "..." } else { "" });
    }
    println!("{count} chunks");
    Ok(())
}
