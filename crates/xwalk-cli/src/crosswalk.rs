//! # Crosswalk Subcommand
//!
//! Loads the catalog into an in-memory store and runs the same service the
//! HTTP API uses, so output matches `GET /v1/frameworks/{id}/crosswalk`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use xwalk_core::CrosswalkFilters;
use xwalk_service::{CrosswalkService, ServiceConfig};

use crate::load_catalog;

/// Arguments for the `xwalk crosswalk` subcommand.
#[derive(Args, Debug)]
pub struct CrosswalkArgs {
    /// Catalog seed file (.json, .yaml, .yml).
    #[arg(long)]
    pub catalog: PathBuf,

    /// Source framework identifier.
    #[arg(long)]
    pub framework: String,

    /// Restrict targets to one framework.
    #[arg(long)]
    pub target_framework: Option<String>,

    /// Suggestion floor in [0, 1].
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Suggestions kept per source control.
    #[arg(long, default_value_t = 3)]
    pub max_suggestions: usize,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the crosswalk subcommand.
pub fn run_crosswalk(args: &CrosswalkArgs, out: &mut dyn Write) -> Result<u8> {
    let store = load_catalog(&args.catalog)?.into_store()?;

    let mut config = ServiceConfig::default();
    config.generator.max_suggestions_per_control = args.max_suggestions;
    let service = CrosswalkService::from_store(Arc::new(store), config);

    let filters = CrosswalkFilters {
        target_framework_id: args.target_framework.clone(),
        min_confidence: args.min_confidence,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let response = runtime.block_on(service.generate_crosswalk(&args.framework, filters))?;

    tracing::info!(
        framework = %args.framework,
        total = response.total,
        "crosswalk generated"
    );

    if args.pretty {
        serde_json::to_writer_pretty(&mut *out, &response)?;
    } else {
        serde_json::to_writer(&mut *out, &response)?;
    }
    writeln!(out)?;
    Ok(0)
}
