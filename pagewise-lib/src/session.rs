//! Interactive read-eval loop
//!
//! Reads one command per line:
//! - `exit` / `quit` ends the session (so does end of input)
//! - `add_doc` asks for a filename and ingests it
//! - anything else is a question
//!
//! Failures of a single command are reported and the loop keeps going; only
//! stream errors end the session early.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::warn;

use crate::answer::Answerer;
use crate::embed::Embedder;
use crate::extract::TextExtractor;
use crate::pipeline::Pipeline;
use crate::{Error, Result};

pub const QUESTION_PROMPT: &str = "Ask something: ";
pub const FILENAME_PROMPT: &str = "Type the filename: ";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    AddDoc,
    Ask(String),
    Empty,
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "exit" | "quit" => Self::Exit,
            "add_doc" => Self::AddDoc,
            question => Self::Ask(question.to_string()),
        }
    }
}

/// Drives a [`Pipeline`] from a line-oriented input stream.
pub struct Session<'p, X: TextExtractor, E: Embedder, A: Answerer> {
    pipeline: &'p mut Pipeline<X, E, A>,
}

impl<'p, X: TextExtractor, E: Embedder, A: Answerer> Session<'p, X, E, A> {
    pub fn new(pipeline: &'p mut Pipeline<X, E, A>) -> Self {
        Self { pipeline }
    }

    /// Run until `exit`, `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        loop {
            let Some(line) = prompt(&mut input, &mut output, QUESTION_PROMPT)? else {
                break;
            };

            match Command::parse(&line) {
                Command::Exit => break,
                Command::Empty => continue,
                Command::AddDoc => {
                    let Some(filename) = prompt(&mut input, &mut output, FILENAME_PROMPT)? else {
                        break;
                    };
                    let filename = filename.trim();
                    match self.pipeline.ingest(Path::new(filename)) {
                        Ok(report) => writeln!(
                            output,
                            "Added '{filename}': {} chunks from {} pages.",
                            report.chunks, report.pages
                        )?,
                        Err(e) => report_failure(&mut output, filename, e)?,
                    }
                }
                Command::Ask(question) => match self.pipeline.ask(&question) {
                    Ok(answer) => writeln!(output, "{}", answer.text.trim_end())?,
                    Err(e) => report_failure(&mut output, &question, e)?,
                },
            }
        }
        output.flush()?;
        Ok(())
    }
}

/// Print `text`, then read one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn report_failure<W: Write>(output: &mut W, subject: &str, err: Error) -> Result<()> {
    match err {
        Error::NotFound(_) => {
            writeln!(output, "File '{subject}' not found. Pass.")?;
            Ok(())
        }
        err if err.is_recoverable() => {
            warn!(error = %err, "command failed");
            writeln!(output, "Error: {err}")?;
            Ok(())
        }
        err => Err(err),
    }
}
