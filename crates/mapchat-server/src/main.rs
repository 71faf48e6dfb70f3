mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Result;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use configuration::Settings;
use mapchat::agent::Agent;
use mapchat::catalog::GeojsonCatalog;
use mapchat::embedding::{VoyageConfig, VoyageEmbedder};
use mapchat::index::{PineconeConfig, PineconeIndex};
use mapchat::providers::anthropic::AnthropicProvider;
use mapchat::providers::configs::AnthropicConfig;
use mapchat::resolver::RegionResolver;
use mapchat::search::{SerpApiClient, SerpApiConfig};
use state::AppState;

fn build_state(settings: &Settings) -> Result<AppState> {
    let resolver_provider = AnthropicProvider::new(AnthropicConfig::new(
        settings.anthropic.host.clone(),
        settings.anthropic.api_key.clone(),
        settings.anthropic.resolver_model.clone(),
    ))?;
    let resolver = RegionResolver::new(
        Box::new(resolver_provider),
        Box::new(VoyageEmbedder::new(VoyageConfig::new(
            settings.voyage.host.clone(),
            settings.voyage.api_key.clone(),
            settings.voyage.model.clone(),
        ))?),
        Box::new(PineconeIndex::new(PineconeConfig::new(
            settings.pinecone.host.clone(),
            settings.pinecone.api_key.clone(),
        ))?),
    );

    let mut chat_config = AnthropicConfig::new(
        settings.anthropic.host.clone(),
        settings.anthropic.api_key.clone(),
        settings.anthropic.model.clone(),
    );
    chat_config.max_tokens = settings.anthropic.max_tokens;
    let chat_provider = AnthropicProvider::new(chat_config)?;

    let mut agent = Agent::new(
        Box::new(chat_provider),
        Box::new(GeojsonCatalog::new(settings.catalog.data_dir.clone())),
    )
    .with_max_tool_turns(settings.max_tool_turns);
    if let Some(serpapi) = &settings.serpapi {
        agent = agent.with_search(Box::new(SerpApiClient::new(SerpApiConfig::new(
            serpapi.host.clone(),
            serpapi.api_key.clone(),
        ))?));
    }

    Ok(AppState::new(resolver, agent))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let state = build_state(&settings)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
