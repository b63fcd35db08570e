//! Shared application state for the trigger server.

use std::sync::Arc;

use neuronews_common::Config;
use neuronews_db::PgStore;

/// State injected into every handler. External-service clients are NOT
/// held here; handlers construct them per run.
pub struct AppState {
    pub store: PgStore,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;
