use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use super::role::Role;
use super::tool::ToolUse;

/// Content passed inside a message. The serialized form matches the
/// Anthropic block format (`{"type": "text", ...}` etc.) so transcripts can
/// cross the HTTP boundary without a translation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    ToolUse(ToolUse),
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn tool_use(tool_use: ToolUse) -> Self {
        MessageContent::ToolUse(tool_use)
    }

    pub fn tool_result<I: Into<String>, C: Into<String>>(tool_use_id: I, content: C) -> Self {
        MessageContent::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUse> {
        match self {
            MessageContent::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        }
    }
}

/// A message to or from the generation model.
///
/// `created` is a local bookkeeping timestamp. It is never sent to the model;
/// the wire converters emit only `role` and `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default = "timestamp_now")]
    pub created: i64,
    #[serde(deserialize_with = "deserialize_content")]
    pub content: Vec<MessageContent>,
}

fn timestamp_now() -> i64 {
    Utc::now().timestamp()
}

/// Front-end chat payloads send `content` as a plain string; the model and
/// our own transcripts use block arrays. Accept both.
fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<MessageContent>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ContentField {
        Text(String),
        Blocks(Vec<MessageContent>),
    }

    Ok(match ContentField::deserialize(deserializer)? {
        ContentField::Text(text) => vec![MessageContent::text(text)],
        ContentField::Blocks(blocks) => blocks,
    })
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: timestamp_now(),
            content: Vec::new(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: timestamp_now(),
            content: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    pub fn with_tool_use(self, tool_use: ToolUse) -> Self {
        self.with_content(MessageContent::tool_use(tool_use))
    }

    pub fn with_tool_result<I: Into<String>, C: Into<String>>(
        self,
        tool_use_id: I,
        content: C,
    ) -> Self {
        self.with_content(MessageContent::tool_result(tool_use_id, content))
    }

    /// All tool invocations requested in this message, in block order.
    pub fn tool_uses(&self) -> Vec<&ToolUse> {
        self.content
            .iter()
            .filter_map(MessageContent::as_tool_use)
            .collect()
    }

    /// Concatenated text blocks, used when feeding a whole response into a
    /// follow-up parse step.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
