use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Other(config::ConfigError::Message(
                format!("invalid listen address {}:{}", self.host, self.port),
            )))
    }
}

#[derive(Debug, Deserialize)]
pub struct AnthropicSettings {
    #[serde(default = "default_anthropic_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_resolver_model")]
    pub resolver_model: String,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct VoyageSettings {
    #[serde(default = "default_voyage_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct PineconeSettings {
    pub host: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct SerpApiSettings {
    #[serde(default = "default_serpapi_host")]
    pub host: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub anthropic: AnthropicSettings,
    pub voyage: VoyageSettings,
    pub pinecone: PineconeSettings,
    #[serde(default)]
    pub serpapi: Option<SerpApiSettings>,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default = "default_max_tool_turns")]
    pub max_tool_turns: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MAPCHAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Map missing-field errors to the env var the operator should set.
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_anthropic_host() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_chat_model() -> String {
    "claude-3-5-sonnet-20240620".to_string()
}

fn default_resolver_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_voyage_host() -> String {
    "https://api.voyageai.com".to_string()
}

fn default_embedding_model() -> String {
    "voyage-large-2".to_string()
}

fn default_serpapi_host() -> String {
    "https://serpapi.com".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_max_tool_turns() -> usize {
    mapchat::agent::DEFAULT_MAX_TOOL_TURNS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("MAPCHAT_") {
                env::remove_var(&key);
            }
        }
    }

    fn set_required_env() {
        env::set_var("MAPCHAT_ANTHROPIC__API_KEY", "anthropic-key");
        env::set_var("MAPCHAT_VOYAGE__API_KEY", "voyage-key");
        env::set_var("MAPCHAT_PINECONE__HOST", "https://idx.pinecone.io");
        env::set_var("MAPCHAT_PINECONE__API_KEY", "pinecone-key");
    }

    #[test]
    #[serial]
    fn default_settings() {
        clean_env();
        set_required_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.anthropic.model, "claude-3-5-sonnet-20240620");
        assert_eq!(settings.anthropic.resolver_model, "claude-3-haiku-20240307");
        assert_eq!(settings.voyage.model, "voyage-large-2");
        assert_eq!(settings.catalog.data_dir, "data");
        assert!(settings.serpapi.is_none());

        clean_env();
    }

    #[test]
    #[serial]
    fn missing_api_key_names_the_env_var() {
        clean_env();
        env::set_var("MAPCHAT_VOYAGE__API_KEY", "voyage-key");
        env::set_var("MAPCHAT_PINECONE__HOST", "https://idx.pinecone.io");
        env::set_var("MAPCHAT_PINECONE__API_KEY", "pinecone-key");

        let error = Settings::new().unwrap_err();
        match error {
            ConfigError::MissingEnvVar { env_var } => {
                assert!(env_var.starts_with("MAPCHAT_"));
            }
            other => panic!("expected MissingEnvVar, got {:?}", other),
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn environment_overrides() {
        clean_env();
        set_required_env();
        env::set_var("MAPCHAT_SERVER__PORT", "8080");
        env::set_var("MAPCHAT_ANTHROPIC__MODEL", "claude-3-opus-20240229");
        env::set_var("MAPCHAT_MAX_TOOL_TURNS", "4");
        env::set_var("MAPCHAT_SERPAPI__API_KEY", "serp-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.anthropic.model, "claude-3-opus-20240229");
        assert_eq!(settings.max_tool_turns, 4);
        let serpapi = settings.serpapi.unwrap();
        assert_eq!(serpapi.api_key, "serp-key");
        assert_eq!(serpapi.host, "https://serpapi.com");

        clean_env();
    }

    #[test]
    fn socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
