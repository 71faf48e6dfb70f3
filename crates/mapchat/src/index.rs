use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use crate::models::region::RegionInfo;

/// A nearest-neighbor hit from the similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub score: f32,
    pub metadata: RegionInfo,
}

/// Vector store of region records. Records are written by an offline
/// ingestion process; the pipeline only queries.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Top-K nearest records for the given vector. An empty result is a
    /// normal outcome (the index may be empty), not an error.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>>;
}

#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub host: String,
    pub api_key: String,
}

impl PineconeConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        PineconeConfig {
            host: host.into(),
            api_key: api_key.into(),
        }
    }
}

pub struct PineconeIndex {
    client: Client,
    config: PineconeConfig,
}

impl PineconeIndex {
    pub fn new(config: PineconeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SimilarityIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        let url = format!("{}/query", self.config.host.trim_end_matches('/'));
        let payload = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!(
                "similarity index returned an error: {}",
                response.status()
            ));
        }

        let data: Value = response.json().await?;
        let matches = data
            .get("matches")
            .and_then(|m| m.as_array())
            .cloned()
            .unwrap_or_default();

        // Hits without metadata cannot resolve a region; skip them.
        let mut results = Vec::new();
        for hit in matches {
            let score = hit.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32;
            if let Some(metadata) = hit.get("metadata") {
                let metadata: RegionInfo = serde_json::from_value(metadata.clone())?;
                results.push(IndexMatch { score, metadata });
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn query_parses_matches() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Api-Key", "test_key"))
            .and(body_partial_json(json!({"topK": 3, "includeMetadata": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    {
                        "id": "rec1",
                        "score": 0.92,
                        "metadata": {
                            "region": "Chicago",
                            "subregions": ["Cook County", "DuPage County"]
                        }
                    },
                    {"id": "rec2", "score": 0.80}
                ]
            })))
            .mount(&mock_server)
            .await;

        let index = PineconeIndex::new(PineconeConfig::new(mock_server.uri(), "test_key"))?;
        let matches = index.query(&[0.1, 0.2], 3).await?;

        // The metadata-less hit is dropped.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].metadata.region, "Chicago");
        assert!((matches[0].score - 0.92).abs() < 1e-6);
        Ok(())
    }

    #[tokio::test]
    async fn query_handles_empty_index() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
            .mount(&mock_server)
            .await;

        let index = PineconeIndex::new(PineconeConfig::new(mock_server.uri(), "key"))?;
        let matches = index.query(&[0.5], 3).await?;
        assert!(matches.is_empty());
        Ok(())
    }
}
