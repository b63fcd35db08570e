//! neuronews trigger server.
//!
//! Run with: cargo run -p neuronews-web

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use neuronews_common::Config;
use neuronews_db::PgStore;
use neuronews_web::router::build_router;
use neuronews_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = PgStore::connect(&config.database_url).await?;
    store.ensure_schema().await?;

    let addr: SocketAddr = config.bind_addr.parse()?;
    let app = build_router(AppState { store, config });

    info!("trigger server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
