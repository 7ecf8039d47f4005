use std::sync::Arc;

use episode_engine::{Engine, EngineHandle};

use crate::effects::{spawn_event_pump, EffectRunner};
use crate::session::HarvestSession;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Engine,
    pub harvest: Arc<HarvestSession>,
    /// Prefix for relay URLs in `/sources` answers, without a trailing slash.
    pub public_base_url: String,
}

impl ServerState {
    /// Starts the background harvest engine on the current runtime.
    pub fn new(engine: Engine, public_base_url: &str) -> Self {
        let (handle, events) = EngineHandle::spawn(engine.harvester.clone());
        let harvest = Arc::new(HarvestSession::new(EffectRunner::new(handle)));
        spawn_event_pump(events, harvest.clone());
        Self {
            engine,
            harvest,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}
