/// Configuration for the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl AnthropicConfig {
    pub fn new<H, K, M>(host: H, api_key: K, model: M) -> Self
    where
        H: Into<String>,
        K: Into<String>,
        M: Into<String>,
    {
        AnthropicConfig {
            host: host.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: Some(0.0),
            max_tokens: None,
        }
    }
}
