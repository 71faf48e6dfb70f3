use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel region name returned when resolution fails to find a match.
pub const REGION_NOT_FOUND: &str = "not found";

/// The extraction model's guess at what the user is asking about. The
/// sub-region list is illustrative, not exhaustive; it only needs to be good
/// enough for the similarity search to land near the right record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCandidate {
    pub region: String,
    #[serde(default)]
    pub subregions: Vec<String>,
}

/// Metadata of a region record in the similarity index, and the resolver's
/// output. `extra` carries any additional metadata fields the index stores,
/// so a selected candidate is returned exactly as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub region: String,
    #[serde(default)]
    pub subregions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegionInfo {
    pub fn new<R: Into<String>>(region: R, subregions: Vec<String>) -> Self {
        RegionInfo {
            region: region.into(),
            subregions,
            extra: Map::new(),
        }
    }

    /// The "no match" outcome. Not an error: the loop driver uses it to pick
    /// the unavailable-region system prompt and a discovery-only tool schema.
    pub fn not_found() -> Self {
        RegionInfo::new(REGION_NOT_FOUND, Vec::new())
    }

    pub fn has_subregions(&self) -> bool {
        !self.subregions.is_empty()
    }
}
