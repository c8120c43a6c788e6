//! OpenAI Responses API client.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answer::Answerer;
use crate::config::Config;
use crate::{Error, Result};

/// Blocking client for `POST {api_base}/responses`.
pub struct OpenAiAnswerer {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiAnswerer {
    /// Builds a client using the generation model, base URL and timeout from `config`.
    pub fn new(api_key: &str, config: &Config) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("missing API key".into()));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::InvalidConfig("API key is not a valid header value".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::generation_with("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", config.api_base.trim_end_matches('/')),
            model: config.generation_model.clone(),
        })
    }
}

impl Answerer for OpenAiAnswerer {
    fn answer(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting answer");
        let body = ResponsesRequest {
            model: &self.model,
            input: prompt,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| Error::generation_with("responses request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::generation(format!("responses endpoint returned {status}: {text}")));
        }

        let parsed: ResponsesResponse = resp
            .json()
            .map_err(|e| Error::generation_with("failed to parse responses payload", e))?;
        output_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate every `output_text` part of every message item.
fn output_text(parsed: ResponsesResponse) -> Result<String> {
    let answer: String = parsed
        .output
        .into_iter()
        .filter_map(|item| match item {
            OutputItem::Message { content } => Some(content),
            OutputItem::Other => None,
        })
        .flatten()
        .filter_map(|part| match part {
            ContentPart::OutputText { text } => Some(text),
            ContentPart::Other => None,
        })
        .collect();

    if answer.trim().is_empty() {
        return Err(Error::generation("response contained no output text"));
    }
    Ok(answer)
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ResponsesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let body = ResponsesRequest {
            model: "gpt-4o-mini",
            input: "prompt text",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"model": "gpt-4o-mini", "input": "prompt text"})
        );
    }

    #[test]
    fn test_output_text_skips_other_items() {
        let parsed = parse(
            r#"{"id":"resp_1","object":"response","output":[
                {"type":"reasoning","id":"rs_1","summary":[]},
                {"type":"message","id":"msg_1","role":"assistant","content":[
                    {"type":"output_text","text":"The refund window ","annotations":[]},
                    {"type":"refusal","refusal":"no"},
                    {"type":"output_text","text":"is 30 days.","annotations":[]}
                ]}
            ]}"#,
        );
        assert_eq!(output_text(parsed).unwrap(), "The refund window is 30 days.");
    }

    #[test]
    fn test_empty_output_is_error() {
        let parsed = parse(r#"{"output":[]}"#);
        assert!(matches!(
            output_text(parsed),
            Err(Error::GenerationService { .. })
        ));
    }

    #[test]
    fn test_endpoint_from_base() {
        let answerer = OpenAiAnswerer::new("sk-test", &Config::default()).unwrap();
        assert_eq!(answerer.endpoint, "https://api.openai.com/v1/responses");
        assert_eq!(answerer.model_name(), "gpt-4o-mini");
    }
}
