//! Axum router for the trigger surface.

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::cron::{enrich_articles, fetch_articles};
use crate::state::{AppState, SharedState};

pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/cron/fetch-articles", post(fetch_articles))
        .route("/api/cron/enrich-articles", post(enrich_articles))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
