//! Per-request tool schema construction.
//!
//! The schema is a pure function of the resolved region: it is rebuilt for
//! every request and never cached, because the `estimates` keys must exactly
//! track whatever sub-region list resolution produced. Nothing here hardcodes
//! a geography.

use serde_json::{json, Map, Value};

use crate::models::region::RegionInfo;
use crate::models::tool::Tool;

pub const TOOL_LIST_REGIONS: &str = "list_available_regions";
pub const TOOL_CONTINUOUS_ESTIMATES: &str = "continuous_stats_estimates";
pub const TOOL_CATEGORY_ESTIMATES: &str = "category_stats_estimates";
pub const TOOL_SEARCH_WEB: &str = "search_web";

/// Visualization tools get a static "rendered" acknowledgment rather than
/// real execution; the payload is consumed by the caller from the transcript.
pub fn is_visualization_tool(name: &str) -> bool {
    name == TOOL_CONTINUOUS_ESTIMATES || name == TOOL_CATEGORY_ESTIMATES
}

fn subregion_properties(region: &RegionInfo) -> Value {
    let mut properties = Map::new();
    for subregion in &region.subregions {
        properties.insert(subregion.clone(), json!({"type": "number"}));
    }
    Value::Object(properties)
}

fn discovery_tool() -> Tool {
    Tool::new(
        TOOL_LIST_REGIONS,
        "List all available regions",
        json!({
            "type": "object",
            "properties": {},
        }),
    )
}

fn search_tool() -> Tool {
    Tool::new(
        TOOL_SEARCH_WEB,
        "Search the web for supporting information",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query",
                },
            },
            "required": ["query"],
        }),
    )
}

fn continuous_tool(region: &RegionInfo) -> Tool {
    Tool::new(
        TOOL_CONTINUOUS_ESTIMATES,
        "Provide an estimated continuous statistic for all sub-regions",
        json!({
            "type": "object",
            "properties": {
                "estimates": {
                    "type": "object",
                    "description": "An object with sub-region names as keys and estimated values",
                    "properties": subregion_properties(region),
                },
                "title": {
                    "type": "string",
                    "description": "Title for the map",
                },
                "color1": {
                    "type": "string",
                    "description": "First color for the color scale (e.g., #FF0000 for red)",
                },
                "color2": {
                    "type": "string",
                    "description": "Second color for the color scale (e.g., #0000FF for blue)",
                },
                "legendSide1": {
                    "type": "string",
                    "description": "Legend label for the color1 end of the scale (e.g., Low)",
                },
                "legendSide2": {
                    "type": "string",
                    "description": "Legend label for the color2 end of the scale (e.g., High)",
                },
                "confidence": {
                    "type": "string",
                    "enum": ["Low", "Medium", "High"],
                    "description": "Confidence level of the estimates",
                },
                "regionKey": {
                    "type": "string",
                    "description": "The top-level region key to pass back to the client (not a subdivision)",
                },
            },
            "required": [
                "estimates",
                "title",
                "color1",
                "color2",
                "legendSide1",
                "legendSide2",
                "confidence",
                "regionKey",
            ],
        }),
    )
}

fn category_tool(region: &RegionInfo) -> Tool {
    Tool::new(
        TOOL_CATEGORY_ESTIMATES,
        "Provide an estimated categorical statistic for all sub-regions",
        json!({
            "type": "object",
            "properties": {
                "estimates": {
                    "type": "object",
                    "description": "An object with sub-region names as keys and estimated values",
                    "properties": subregion_properties(region),
                },
                "title": {
                    "type": "string",
                    "description": "Title for the map",
                },
                "categoryColors": {
                    "type": "object",
                    "description": "An object mapping category names to colors (only categories present in the estimates)",
                },
                "confidence": {
                    "type": "string",
                    "enum": ["Low", "Medium", "High"],
                    "description": "Confidence level of the estimates",
                },
                "regionKey": {
                    "type": "string",
                    "description": "The top-level region key to pass back to the client",
                },
            },
            "required": ["estimates", "title", "categoryColors", "confidence", "regionKey"],
        }),
    )
}

/// Build the tool set offered to the generation model for this request.
///
/// With no resolved sub-regions only the discovery tool is exposed, which
/// steers the model toward listing what is available or asking for another
/// region instead of producing estimates.
pub fn build_tools(region: &RegionInfo, with_search: bool) -> Vec<Tool> {
    let mut tools = vec![discovery_tool()];
    if region.has_subregions() {
        tools.push(continuous_tool(region));
        tools.push(category_tool(region));
        if with_search {
            tools.push(search_tool());
        }
    }
    tools
}
