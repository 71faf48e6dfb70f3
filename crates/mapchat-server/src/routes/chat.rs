use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;

use mapchat::models::message::Message;
use mapchat::providers::utils::strip_transport_fields;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<Value>,
}

/// Run a full pipeline pass: resolve the region from the conversation, drive
/// the tool-use loop, and return the grown transcript. Any pipeline failure
/// is a plain 500; the client never receives a partial transcript.
async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    // Previous responses in the transcript may still carry transport fields
    // (message id, model, stop reason, usage); drop them before parsing.
    let filtered = strip_transport_fields(&request.messages);
    let messages: Vec<Message> = filtered
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .map_err(|e| {
            tracing::warn!("rejecting malformed chat request: {}", e);
            StatusCode::BAD_REQUEST
        })?;

    let region = state.resolver.resolve(&messages).await.map_err(|e| {
        tracing::error!("region resolution failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let transcript = state.agent.reply(&messages, &region).await.map_err(|e| {
        tracing::error!("conversation loop failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(transcript))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler))
        .with_state(state)
}
