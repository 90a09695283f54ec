//! # Score Subcommand
//!
//! Pairwise similarity between two catalog controls, without the
//! generator's floor or top-N cut. Handy for tuning `--min-confidence`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use xwalk_core::{round_to, Control};
use xwalk_engine::candidates::{GENERATION_PRECISION, MAX_SHARED_TERMS};
use xwalk_engine::{cosine_similarity, TokenizedControl};

use crate::load_catalog;

/// Arguments for the `xwalk score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Catalog seed file (.json, .yaml, .yml).
    #[arg(long)]
    pub catalog: PathBuf,

    /// Source control identifier.
    #[arg(long)]
    pub source: String,

    /// Target control identifier.
    #[arg(long)]
    pub target: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReport<'a> {
    source: &'a str,
    target: &'a str,
    score: f64,
    matched_terms: Vec<String>,
}

/// Execute the score subcommand.
pub fn run_score(args: &ScoreArgs, out: &mut dyn Write) -> Result<u8> {
    let catalog = load_catalog(&args.catalog)?;
    let source = find_control(&catalog.controls, &args.source)?;
    let target = find_control(&catalog.controls, &args.target)?;

    let source_tokens = TokenizedControl::new(source);
    let target_tokens = TokenizedControl::new(target);
    let score = round_to(
        cosine_similarity(&source_tokens.vector, &target_tokens.vector),
        GENERATION_PRECISION,
    );

    let report = ScoreReport {
        source: &source.id,
        target: &target.id,
        score,
        matched_terms: source_tokens.shared_terms(&target_tokens, MAX_SHARED_TERMS),
    };
    serde_json::to_writer(&mut *out, &report)?;
    writeln!(out)?;
    Ok(0)
}

fn find_control<'a>(controls: &'a [Control], id: &str) -> Result<&'a Control> {
    controls
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("control {id} not found in catalog"))
}
