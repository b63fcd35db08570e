//! Cron trigger handlers — one per batch orchestrator.
//!
//! Both check the shared-secret bearer token before constructing any
//! client or issuing any external call, and both answer with the run's
//! JSON result object.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::info;

use neuronews_ingestion::sources::europepmc::EuropePmcClient;
use neuronews_ingestion::sources::openalex::OpenAlexClient;
use neuronews_ingestion::sources::pubmed::PubMedClient;
use neuronews_ingestion::{run_enrichment, run_ingestion, IngestionJob};
use neuronews_llm::AnthropicBackend;

use crate::auth::token_matches;
use crate::state::SharedState;

type AuthHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn authorized(state: &SharedState, auth: &AuthHeader) -> bool {
    let presented = auth.as_ref().map(|TypedHeader(header)| header.token());
    token_matches(presented, &state.config.cron_secret)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

fn client_setup_error(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "error": format!("client setup failed: {err}")})),
    )
        .into_response()
}

/// POST /api/cron/fetch-articles — one ingestion run.
pub async fn fetch_articles(State(state): State<SharedState>, auth: AuthHeader) -> Response {
    if !authorized(&state, &auth) {
        return unauthorized();
    }

    let gateway = match PubMedClient::new(state.config.pubmed_api_key.clone()) {
        Ok(client) => client,
        Err(e) => return client_setup_error(e),
    };
    let citations = match EuropePmcClient::new() {
        Ok(client) => client,
        Err(e) => return client_setup_error(e),
    };
    let bibliometrics = match OpenAlexClient::new() {
        Ok(client) => client,
        Err(e) => return client_setup_error(e),
    };

    let job = IngestionJob {
        query: state.config.topic_query.clone(),
        lookback_days: state.config.lookback_days,
        max_results: state.config.max_results,
    };

    info!("ingestion run triggered");
    let outcome = run_ingestion(&job, &gateway, &citations, &bibliometrics, &state.store).await;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}

/// POST /api/cron/enrich-articles — one enrichment run.
pub async fn enrich_articles(State(state): State<SharedState>, auth: AuthHeader) -> Response {
    if !authorized(&state, &auth) {
        return unauthorized();
    }

    let backend = AnthropicBackend::new(
        state.config.anthropic_api_key.expose_secret(),
        state.config.llm_model.clone(),
    );

    info!("enrichment run triggered");
    let outcome = run_enrichment(state.config.enrich_limit, &backend, &state.store).await;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}
