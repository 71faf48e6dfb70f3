use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Optional web-search collaborator, exposed to the model as the
/// `search_web` tool when configured.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct SerpApiConfig {
    pub host: String,
    pub api_key: String,
}

impl SerpApiConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        SerpApiConfig {
            host: host.into(),
            api_key: api_key.into(),
        }
    }
}

pub struct SerpApiClient {
    client: Client,
    config: SerpApiConfig,
}

impl SerpApiClient {
    pub fn new(config: SerpApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl WebSearch for SerpApiClient {
    async fn search(&self, query: &str) -> Result<Value> {
        let url = format!("{}/search.json", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("api_key", &self.config.api_key)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!(
                "search service returned an error: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}
