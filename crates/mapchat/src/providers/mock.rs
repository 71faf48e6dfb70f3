use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured responses for testing.
///
/// Also records how many tools each call was offered, so loop tests can
/// assert the forced-stop turn withheld the tool schema.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    offered_tool_counts: Arc<Mutex<Vec<usize>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            offered_tool_counts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn offered_tool_counts(&self) -> Vec<usize> {
        self.offered_tool_counts.lock().unwrap().clone()
    }

    /// Shared handle to the call log for tests that hand the provider off.
    pub fn tool_count_log(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.offered_tool_counts)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.offered_tool_counts.lock().unwrap().push(tools.len());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
