//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::snapshot_cache::SnapshotCache;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>, config: AppConfig) -> Self {
        Self {
            cache,
            config: Arc::new(config),
        }
    }
}
