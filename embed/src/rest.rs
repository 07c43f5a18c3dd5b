use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::EmbedConfig;
use crate::embed::Embedder;
use crate::error::EmbedError;

/// Embedding request body.
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    title: &'a str,
    image_url: &'a str,
}

/// Embedding response.
#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// Calls an HTTP embedding service hosting the joint vision-text encoder.
pub struct RestEmbedder {
    cfg: EmbedConfig,
    client: Client,
}

impl RestEmbedder {
    pub fn new(cfg: EmbedConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Embedder for RestEmbedder {
    async fn embed(&self, title: &str, image_url: &str) -> Result<Vec<f32>, EmbedError> {
        if title.is_empty() || image_url.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let url = format!("{}/embeddings", self.cfg.base_url);
        let body = EmbeddingRequest { title, image_url };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.cfg.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbedError::Api(format!("HTTP {status}: {body}")));
        }

        let data: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbedError::Api(e.to_string()))?;

        if self.cfg.dimension != 0 && data.embedding.len() != self.cfg.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.cfg.dimension,
                got: data.embedding.len(),
            });
        }

        // float64 -> f32 narrowing to match the persisted representation.
        Ok(data.embedding.iter().map(|&v| v as f32).collect())
    }

    fn dimension(&self) -> usize {
        self.cfg.dimension
    }
}
