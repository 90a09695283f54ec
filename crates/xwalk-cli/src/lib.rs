//! # xwalk-cli — Crosswalk Command-Line Interface
//!
//! Offline access to the crosswalk engine over a catalog seed file
//! (see `xwalk_store::CatalogSeed`). Nothing is written back to the file.
//!
//! ## Subcommands
//!
//! - `crosswalk` — Generate a framework's crosswalk and print it as JSON.
//! - `score` — Print the term-overlap similarity of two controls.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handler logic.
//! - Handlers write to a caller-supplied sink so tests can capture output.

pub mod crosswalk;
pub mod score;

use std::path::Path;

use anyhow::{Context, Result};
use xwalk_store::CatalogSeed;

/// Read and parse a catalog seed file.
pub fn load_catalog(path: &Path) -> Result<CatalogSeed> {
    CatalogSeed::from_path(path)
        .with_context(|| format!("failed to load catalog {}", path.display()))
}
