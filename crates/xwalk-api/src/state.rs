//! # Application State
//!
//! Shared state for the Axum application: the crosswalk service wired to
//! its backend, the optional Postgres handle used by readiness probes, and
//! the optional Prometheus handle behind `/metrics`.
//!
//! ## Environment
//!
//! | Variable                 | Default | Meaning                                   |
//! |--------------------------|---------|-------------------------------------------|
//! | `XWALK_PORT`             | 8080    | Listen port                               |
//! | `DATABASE_URL`           | unset   | Postgres backend; in-memory when unset    |
//! | `XWALK_SEED_PATH`        | unset   | Catalog seed for the in-memory backend    |
//! | `XWALK_MAX_SUGGESTIONS`  | 3       | Suggestions kept per source control       |
//! | `XWALK_MIN_CONFIDENCE`   | 0.35    | Default suggestion floor                  |
//! | `XWALK_FILTER_PERSISTED` | false   | Apply `minConfidence` to persisted matches |
//! | `XWALK_METRICS_ENABLED`  | true    | Mount `/metrics`                          |
//! | `XWALK_LOG_FORMAT`       | text    | `json` for structured logs                |
//!
//! Unparseable values fall back to the default with a warning.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use xwalk_core::is_unit_interval;
use xwalk_service::{CrosswalkService, ServiceConfig};
use xwalk_store::{InMemoryStore, PgStore};

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read `XWALK_LOG_FORMAT`; anything other than `json` means text.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("XWALK_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub seed_path: Option<PathBuf>,
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
    pub service: ServiceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            seed_path: None,
            metrics_enabled: true,
            log_format: LogFormat::Text,
            service: ServiceConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut service = defaults.service;

        service.generator.max_suggestions_per_control = parse_or(
            &lookup,
            "XWALK_MAX_SUGGESTIONS",
            service.generator.max_suggestions_per_control,
        );
        if service.generator.max_suggestions_per_control == 0 {
            tracing::warn!("XWALK_MAX_SUGGESTIONS must be at least 1, using default");
            service.generator.max_suggestions_per_control =
                defaults.service.generator.max_suggestions_per_control;
        }

        let min_confidence =
            parse_or(&lookup, "XWALK_MIN_CONFIDENCE", service.generator.min_confidence);
        if is_unit_interval(min_confidence) {
            service.generator.min_confidence = min_confidence;
        } else {
            tracing::warn!(min_confidence, "XWALK_MIN_CONFIDENCE outside [0, 1], using default");
        }

        service.filter_persisted_by_confidence = parse_or(
            &lookup,
            "XWALK_FILTER_PERSISTED",
            service.filter_persisted_by_confidence,
        );

        Self {
            port: parse_or(&lookup, "XWALK_PORT", defaults.port),
            database_url: non_blank(lookup("DATABASE_URL")),
            seed_path: non_blank(lookup("XWALK_SEED_PATH")).map(PathBuf::from),
            metrics_enabled: parse_or(&lookup, "XWALK_METRICS_ENABLED", defaults.metrics_enabled),
            log_format: LogFormat::parse(lookup("XWALK_LOG_FORMAT").as_deref()),
            service,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid configuration value, using default");
            default
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: CrosswalkService,
    /// Present when the Postgres backend is in use.
    pub db: Option<PgStore>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State backed by an in-memory store.
    pub fn in_memory(store: InMemoryStore, config: ServiceConfig) -> Self {
        Self {
            service: CrosswalkService::from_store(Arc::new(store), config),
            db: None,
            metrics: None,
        }
    }

    /// State backed by Postgres.
    pub fn postgres(store: PgStore, config: ServiceConfig) -> Self {
        Self {
            service: CrosswalkService::from_store(Arc::new(store.clone()), config),
            db: Some(store),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
