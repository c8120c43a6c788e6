//! OpenAI-compatible embeddings client.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Blocking embeddings client for `POST {api_base}/embeddings`.
///
/// One call is one request; batching is left to [`embed_batched`](super::embed_batched).
/// Failed requests are not retried.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiEmbedder {
    /// Builds a client using the model, base URL and timeout from `config`.
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
            .map_err(|e| Error::embedding_with("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.api_base.trim_end_matches('/')),
            model: config.embedding_model.clone(),
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| Error::embedding_with("embeddings request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::embedding(format!("embeddings endpoint returned {status}: {body}")));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| Error::embedding_with("failed to parse embeddings response", e))?;
        into_ordered(parsed, inputs.len())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");
        self.request(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.request(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("no embedding returned for query"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Reorder response entries by their `index` and check one per input.
fn into_ordered(mut parsed: EmbeddingResponse, expected: usize) -> Result<Vec<Embedding>> {
    parsed.data.sort_by_key(|entry| entry.index);
    if parsed.data.len() != expected {
        return Err(Error::embedding(format!(
            "service returned {} embeddings for {expected} inputs",
            parsed.data.len()
        )));
    }
    if parsed.data.iter().enumerate().any(|(i, entry)| entry.index != i) {
        return Err(Error::embedding("embedding indices do not cover the inputs"));
    }
    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EmbeddingResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &["first", "second"],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "text-embedding-3-small",
                "input": ["first", "second"],
            })
        );
    }

    #[test]
    fn test_response_reordered_by_index() {
        let parsed = parse(
            r#"{"object":"list","data":[
                {"object":"embedding","index":1,"embedding":[0.0,1.0]},
                {"object":"embedding","index":0,"embedding":[1.0,0.0]}
            ],"model":"m","usage":{"prompt_tokens":2,"total_tokens":2}}"#,
        );
        let out = into_ordered(parsed, 2).unwrap();
        assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_response_count_mismatch() {
        let parsed = parse(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#);
        assert!(matches!(
            into_ordered(parsed, 2),
            Err(Error::EmbeddingService { .. })
        ));
    }

    #[test]
    fn test_response_duplicate_index() {
        let parsed = parse(
            r#"{"data":[{"index":0,"embedding":[1.0]},{"index":0,"embedding":[2.0]}]}"#,
        );
        assert!(into_ordered(parsed, 2).is_err());
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenAiEmbedder::new("  ", &Config::default());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_endpoint_from_base() {
        let config = Config {
            api_base: "http://localhost:8080/v1/".into(),
            ..Config::default()
        };
        let embedder = OpenAiEmbedder::new("sk-test", &config).unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }
}
