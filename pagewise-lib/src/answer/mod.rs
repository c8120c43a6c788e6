//! Answer generation
//!
//! An [`Answerer`] turns a prompt into text. The prompt itself is fixed:
//! [`build_prompt`] places the question and the retrieved context into a
//! single template.

use crate::Result;

/// Trait implemented by concrete generation backends.
pub trait Answerer: Send + Sync {
    /// Generate a completion for `prompt`. Not retried on failure.
    fn answer(&self, prompt: &str) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Separator between retrieved chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Render the question-answering prompt.
#[must_use]
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You're a PDF assistant. The question to you is: {question}\n\n\
         Answer the question, using the following context:\n\
         {context}\n\n\
         Answer:\n"
    )
}

/// Join retrieved chunk texts into a context block.
pub fn render_context<'a>(chunks: impl IntoIterator<Item = &'a str>) -> String {
    chunks
        .into_iter()
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

mod openai;

pub use openai::OpenAiAnswerer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_question_and_context() {
        let prompt = build_prompt("What is the refund window?", "Refunds within 30 days.");

        assert!(prompt.starts_with("You're a PDF assistant. The question to you is: What is the refund window?"));
        assert!(prompt.contains("using the following context:\nRefunds within 30 days.\n"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_render_context() {
        assert_eq!(render_context(["one", "two"]), "one\n\ntwo");
        assert_eq!(render_context(Vec::<&str>::new()), "");
    }
}
