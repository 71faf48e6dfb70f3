use serde_json::{json, Value};

use crate::models::message::Message;

/// Convert internal messages to the canonical request shape the generation
/// model accepts: `role` and `content` only. The `created` bookkeeping field
/// never crosses the wire.
pub fn messages_to_wire(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role,
                "content": message.content,
            })
        })
        .collect()
}

/// Drop transport-only fields (`id`, `model`, `stop_reason`, usage counters
/// and anything else a previous model response carried) from raw transcript
/// entries, keeping only `role` and `content`. Re-applying the filter to an
/// already-filtered list is a no-op.
pub fn strip_transport_fields(messages: &[Value]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let mut kept = serde_json::Map::new();
            if let Some(object) = message.as_object() {
                for key in ["role", "content"] {
                    if let Some(value) = object.get(key) {
                        kept.insert(key.to_string(), value.clone());
                    }
                }
            }
            Value::Object(kept)
        })
        .collect()
}
