use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Turns free text into a fixed-length vector via an external embedding
/// service. A failed call fails the whole request; there is no retry or
/// partial degradation.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone)]
pub struct VoyageConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl VoyageConfig {
    pub fn new<H, K, M>(host: H, api_key: K, model: M) -> Self
    where
        H: Into<String>,
        K: Into<String>,
        M: Into<String>,
    {
        VoyageConfig {
            host: host.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

pub struct VoyageEmbedder {
    client: Client,
    config: VoyageConfig,
}

impl VoyageEmbedder {
    pub fn new(config: VoyageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Embedder for VoyageEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.config.host.trim_end_matches('/'));
        let payload = json!({
            "input": [text],
            "model": self.config.model,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!(
                "embedding service returned an error: {}",
                response.status()
            ));
        }

        let data: Value = response.json().await?;
        let embedding = data
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|arr| arr.first())
            .and_then(|first| first.get("embedding"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow!("embedding response missing data[0].embedding"))?;

        embedding
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| anyhow!("non-numeric embedding component"))
            })
            .collect()
    }
}
