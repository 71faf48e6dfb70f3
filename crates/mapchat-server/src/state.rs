use std::sync::Arc;

use mapchat::agent::Agent;
use mapchat::resolver::RegionResolver;

/// Shared application state: the resolver and loop driver are built once at
/// startup with their injected clients and shared across requests. All
/// per-request state (transcript, resolved region, tool schema) lives inside
/// a single handler invocation.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RegionResolver>,
    pub agent: Arc<Agent>,
}

impl AppState {
    pub fn new(resolver: RegionResolver, agent: Agent) -> Self {
        Self {
            resolver: Arc::new(resolver),
            agent: Arc::new(agent),
        }
    }
}
