use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Catalog of the top-level regions the front end can draw. Backs the
/// `list_available_regions` discovery tool.
#[async_trait]
pub trait RegionCatalog: Send + Sync {
    async fn list_regions(&self) -> Result<Vec<String>>;
}

/// Lists the geojson boundary files shipped alongside the server; each
/// `<region>.json` file is one available geography.
pub struct GeojsonCatalog {
    data_dir: PathBuf,
}

impl GeojsonCatalog {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[async_trait]
impl RegionCatalog for GeojsonCatalog {
    async fn list_regions(&self) -> Result<Vec<String>> {
        // A missing directory is an empty catalog, not a failure.
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        let mut regions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    regions.push(stem.to_string());
                }
            }
        }
        regions.sort();

        Ok(regions)
    }
}
