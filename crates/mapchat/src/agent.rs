//! The conversation loop driver.
//!
//! Each turn offers the model a tool schema built from the resolved region,
//! dispatches any tool invocations the response carries, appends the paired
//! tool results, and goes around again. The loop is bounded: after
//! `max_tool_turns` tool rounds the model is called once more with no tools
//! at all, so the final turn cannot request another round.

use anyhow::Result;

use crate::catalog::RegionCatalog;
use crate::errors::AgentError;
use crate::models::message::Message;
use crate::models::region::RegionInfo;
use crate::models::tool::ToolUse;
use crate::prompts;
use crate::providers::base::Provider;
use crate::schema::{self, TOOL_LIST_REGIONS, TOOL_SEARCH_WEB};
use crate::search::WebSearch;

pub const DEFAULT_MAX_TOOL_TURNS: usize = 8;

pub struct Agent {
    provider: Box<dyn Provider>,
    catalog: Box<dyn RegionCatalog>,
    search: Option<Box<dyn WebSearch>>,
    max_tool_turns: usize,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, catalog: Box<dyn RegionCatalog>) -> Self {
        Self {
            provider,
            catalog,
            search: None,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
        }
    }

    pub fn with_search(mut self, search: Box<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_max_tool_turns(mut self, max_tool_turns: usize) -> Self {
        self.max_tool_turns = max_tool_turns;
        self
    }

    /// Drive the model until it stops requesting tools, then return the full
    /// transcript: the input messages plus every assistant response and
    /// synthesized tool result, in order.
    pub async fn reply(
        &self,
        messages: &[Message],
        region: &RegionInfo,
    ) -> Result<Vec<Message>> {
        let system = prompts::chat_system(region);
        let mut transcript = messages.to_vec();

        let mut turn = 0;
        loop {
            // The schema is rebuilt every turn from the resolved region; on
            // the last permitted turn it is withheld entirely, which forces
            // the model to produce a terminal response.
            let tools = if turn < self.max_tool_turns {
                schema::build_tools(region, self.search.is_some())
            } else {
                Vec::new()
            };

            let (response, _usage) = self
                .provider
                .complete(&system, &transcript, &tools)
                .await?;
            let tool_uses: Vec<ToolUse> =
                response.tool_uses().into_iter().cloned().collect();
            transcript.push(response);

            if tool_uses.is_empty() || turn >= self.max_tool_turns {
                return Ok(transcript);
            }

            let mut results = Message::user();
            for tool_use in &tool_uses {
                tracing::debug!(tool = %tool_use.name, turn, "dispatching tool call");
                let output = self.dispatch(tool_use).await?;
                results = results.with_tool_result(tool_use.id.clone(), output);
            }
            transcript.push(results);

            turn += 1;
        }
    }

    /// Execute one tool invocation and produce the tool-result content.
    ///
    /// Visualization tools are acknowledged with a fixed "rendered" payload;
    /// the estimates themselves travel to the caller inside the transcript
    /// and are not inspected here.
    async fn dispatch(&self, tool_use: &ToolUse) -> Result<String> {
        if schema::is_visualization_tool(&tool_use.name) {
            return Ok("rendered".to_string());
        }

        match tool_use.name.as_str() {
            TOOL_LIST_REGIONS => {
                let regions = self.catalog.list_regions().await?;
                Ok(serde_json::to_string(&regions)?)
            }
            TOOL_SEARCH_WEB => {
                let search = self
                    .search
                    .as_ref()
                    .ok_or(AgentError::SearchUnavailable)?;
                let query = tool_use
                    .input
                    .get("query")
                    .and_then(|q| q.as_str())
                    .unwrap_or_default();
                let results = search.search(query).await?;
                Ok(serde_json::to_string(&results)?)
            }
            other => Err(AgentError::ToolNotFound(other.to_string()).into()),
        }
    }
}
