use thiserror::Error;

/// Fatal failures inside the region resolution step.
///
/// "No match" is deliberately not represented here: an unresolvable region is
/// a business outcome (the sentinel), not an error. Upstream service failures
/// travel as `anyhow::Error` from the client that hit them.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("extraction response was not a region object: {0}")]
    MalformedExtraction(String),
}

/// Fatal failures inside the conversation loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model requested unknown tool: {0}")]
    ToolNotFound(String),

    #[error("search tool requested but no search client is configured")]
    SearchUnavailable,
}
