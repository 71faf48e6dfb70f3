use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Translate a config field path like `anthropic.api_key` into the
/// environment variable that would supply it.
pub fn to_env_var(field: &str) -> String {
    format!("MAPCHAT_{}", field.replace('.', "__").to_uppercase())
}
