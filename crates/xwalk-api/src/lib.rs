//! # xwalk-api — Crosswalk HTTP Service
//!
//! Axum application exposing the crosswalk engine.
//!
//! ## API Surface
//!
//! | Method | Path                                                        | Handler                 |
//! |--------|-------------------------------------------------------------|-------------------------|
//! | GET    | `/v1/frameworks/{id}/crosswalk`                             | crosswalk generation    |
//! | PUT    | `/v1/frameworks/{id}/crosswalk/mappings`                    | manual mapping upsert   |
//! | DELETE | `/v1/frameworks/{id}/crosswalk/mappings/{source}/{target}`  | manual mapping delete   |
//! | GET    | `/health/liveness`, `/health/readiness`                     | probes                  |
//! | GET    | `/metrics`                                                  | Prometheus scrape       |
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; everything delegates to
//!   `xwalk-service`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState, LogFormat};

/// Assemble the application router.
///
/// `/metrics` is mounted only when the state carries a Prometheus handle.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::crosswalk::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));
    if state.metrics.is_some() {
        probes = probes.route("/metrics", get(prometheus_metrics));
    }

    Router::new().merge(probes.with_state(state)).merge(api)
}

/// GET /metrics — Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — checks the database when the Postgres backend is in use.
async fn readiness(State(state): State<AppState>) -> Response {
    if let Some(db) = &state.db {
        if let Err(e) = db.ping().await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}
