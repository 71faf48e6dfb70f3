use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::AnthropicConfig;
use super::utils::messages_to_wire;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolUse};

const DEFAULT_MAX_TOKENS: i32 = 3000;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = data.get("usage");
        let input_tokens = usage
            .and_then(|u| u.get("input_tokens"))
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = usage
            .and_then(|u| u.get("output_tokens"))
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn tools_to_spec(tools: &[Tool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect()
    }

    /// Parse the response content array into an assistant message, keeping
    /// text and tool_use blocks. Transport fields of the response (id, model,
    /// stop reason, usage) are dropped here; the loop driver detects tool use
    /// from the parsed blocks.
    fn response_to_message(response: &Value) -> Result<Message> {
        let content = response
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| anyhow!("response has no content array"))?;

        let mut message = Message::assistant();
        for block in content {
            match block.get("type").and_then(|t| t.as_str()) {
                Some("text") => {
                    let text = block
                        .get("text")
                        .and_then(|t| t.as_str())
                        .ok_or_else(|| anyhow!("text block without text"))?;
                    message = message.with_text(text);
                }
                Some("tool_use") => {
                    let id = block
                        .get("id")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| anyhow!("tool_use block without id"))?;
                    let name = block
                        .get("name")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| anyhow!("tool_use block without name"))?;
                    let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                    message = message.with_tool_use(ToolUse::new(id, name, input));
                }
                other => {
                    return Err(anyhow!("unsupported content block type: {:?}", other));
                }
            }
        }

        Ok(message)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {}", error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "system": system,
            "messages": messages_to_wire(messages),
        });

        let object = payload.as_object_mut().unwrap();
        if let Some(temperature) = self.config.temperature {
            object.insert("temperature".to_string(), json!(temperature));
        }
        if !tools.is_empty() {
            object.insert("tools".to_string(), json!(Self::tools_to_spec(tools)));
        }

        let response = self.post(payload).await?;
        let message = Self::response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(response_body: Value) -> (MockServer, AnthropicProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let config = AnthropicConfig::new(
            mock_server.uri(),
            "test_api_key",
            "claude-3-5-sonnet-20240620",
        );
        let provider = AnthropicProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn complete_parses_text_response() -> Result<()> {
        let response_body = json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "The data has been rendered on the map."}],
            "model": "claude-3-5-sonnet-20240620",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 15}
        });

        let (_, provider) = setup_mock_server(response_body).await;
        let messages = vec![Message::user().with_text("Population of Chicago counties?")];

        let (message, usage) = provider.complete("system prompt", &messages, &[]).await?;

        assert_eq!(
            message.content[0],
            MessageContent::text("The data has been rendered on the map.")
        );
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.total_tokens, Some(27));
        Ok(())
    }

    #[tokio::test]
    async fn complete_parses_tool_use_blocks() -> Result<()> {
        let response_body = json!({
            "id": "msg_456",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Estimating now."},
                {
                    "type": "tool_use",
                    "id": "toolu_01",
                    "name": "continuous_stats_estimates",
                    "input": {"estimates": {"Cook County": 5.2}, "title": "Population"}
                }
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 40, "output_tokens": 22}
        });

        let (_, provider) = setup_mock_server(response_body).await;
        let messages = vec![Message::user().with_text("estimate it")];
        let tools = vec![Tool::new("continuous_stats_estimates", "desc", json!({}))];

        let (message, _) = provider.complete("system", &messages, &tools).await?;

        let tool_uses = message.tool_uses();
        assert_eq!(tool_uses.len(), 1);
        assert_eq!(tool_uses[0].name, "continuous_stats_estimates");
        assert_eq!(tool_uses[0].input["title"], "Population");
        Ok(())
    }

    #[tokio::test]
    async fn complete_propagates_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let config = AnthropicConfig::new(mock_server.uri(), "key", "model");
        let provider = AnthropicProvider::new(config).unwrap();

        let result = provider
            .complete("system", &[Message::user().with_text("hi")], &[])
            .await;
        assert!(result.is_err());
    }
}
