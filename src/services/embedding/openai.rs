//! OpenAI-compatible embeddings client
//!
//! Texts are sent in chunks of `batch_size`; 429 and 5xx responses are
//! retried with exponential backoff. Empty texts are never sent and come
//! back as empty vectors.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::Embedder;

const DEFAULT_BATCH_SIZE: usize = 64;
const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Clone)]
pub struct OpenAiEmbedder {
    http_client: HttpClient,
    endpoint: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_retries: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_url: &str,
        api_key: Option<&str>,
        model: String,
        dimensions: usize,
    ) -> AppResult<Self> {
        if model.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "embedding model name is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            let auth = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
                .map_err(|e| AppError::InvalidInput(format!("invalid embedding API key: {}", e)))?;
            headers.insert(AUTHORIZATION, auth);
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/embeddings", api_url.trim_end_matches('/')),
            model,
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Sends one chunk and returns its vectors ordered like the input
    async fn embed_chunk(&self, inputs: &[&str]) -> AppResult<Vec<Vec<f32>>> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: inputs,
                dimensions: self.dimensions,
            };

            let result = self.http_client.post(&self.endpoint).json(&request).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: EmbeddingResponse = response.json().await?;
                    return Ok(order_by_index(parsed.data, inputs.len()));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::warn!(%status, attempt, "Embedding request failed, retrying");
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }
                    return Err(AppError::ExternalApi(format!(
                        "embedding request failed ({}): {}",
                        status, body
                    )));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt + 1 < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "Embedding request error, retrying");
                    tokio::time::sleep(retry_backoff(attempt)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut vectors = vec![Vec::new(); texts.len()];

        let positions: Vec<usize> = (0..texts.len())
            .filter(|&i| !texts[i].trim().is_empty())
            .collect();

        for chunk in positions.chunks(self.batch_size) {
            let inputs: Vec<&str> = chunk.iter().map(|&i| texts[i].as_str()).collect();
            let embedded = self.embed_chunk(&inputs).await?;
            for (&pos, vector) in chunk.iter().zip(embedded) {
                vectors[pos] = vector;
            }
        }

        tracing::debug!(
            texts = texts.len(),
            sent = positions.len(),
            model = %self.model,
            "Embedded text batch"
        );

        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn order_by_index(data: Vec<EmbeddingData>, expected: usize) -> Vec<Vec<f32>> {
    let mut ordered = vec![Vec::new(); expected];
    for entry in data {
        if let Some(slot) = ordered.get_mut(entry.index) {
            *slot = entry.embedding;
        }
    }
    ordered
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    dimensions: usize,
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
