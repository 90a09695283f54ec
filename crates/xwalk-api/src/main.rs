//! Crosswalk API server.
//!
//! Backend selection: Postgres when `DATABASE_URL` is set, otherwise an
//! in-memory store loaded from `XWALK_SEED_PATH` (or empty).

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;
use xwalk_api::{AppConfig, AppState, LogFormat};
use xwalk_store::{CatalogSeed, InMemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());
    let config = AppConfig::from_env();

    let mut state = match &config.database_url {
        Some(url) => AppState::postgres(PgStore::connect(url).await?, config.service),
        None => {
            let store = match &config.seed_path {
                Some(path) => CatalogSeed::from_path(path)?.into_store()?,
                None => {
                    tracing::warn!("no DATABASE_URL or XWALK_SEED_PATH set, starting with an empty catalog");
                    InMemoryStore::new()
                }
            };
            AppState::in_memory(store, config.service)
        }
    };

    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }

    let app = xwalk_api::app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("xwalk-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
