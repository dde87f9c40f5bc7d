//! Application state shared by the feed and the session

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::game::InputCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Written by the feed, read by the reward aggregator
    pub input_cache: Arc<InputCache>,
    /// Tags every log line of this run
    pub session_id: Uuid,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            input_cache: Arc::new(InputCache::new()),
            session_id: Uuid::new_v4(),
        }
    }
}
