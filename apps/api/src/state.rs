use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::quiz::gate::GateConfig;
use crate::store::ProgressStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Store handle opened once at startup. `PgStore` in production.
    pub store: Arc<dyn ProgressStore>,
    pub config: Config,
    pub gate: GateConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ProgressStore>, config: Config) -> Self {
        let gate = GateConfig::from_hours(config.unlock_interval_hours);
        Self {
            store,
            config,
            gate,
        }
    }
}

/// The caller's identity, as resolved by the upstream auth layer.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}
