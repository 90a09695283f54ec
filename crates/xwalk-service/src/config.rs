//! # Service Configuration

use serde::{Deserialize, Serialize};
use xwalk_engine::GeneratorOptions;

/// Tuning for [`CrosswalkService`](crate::CrosswalkService).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Generator defaults; a request's `minConfidence` overrides the floor.
    pub generator: GeneratorOptions,

    /// Pairwise comparisons per request above which a warning is logged.
    pub comparison_warn_threshold: usize,

    /// Apply the request's `minConfidence` to persisted matches on the live
    /// path too. Off by default: only suggestions are filtered there, while
    /// the warmup path filters everything.
    pub filter_persisted_by_confidence: bool,

    /// Drop the source framework's warmup entry after every manual write.
    pub invalidate_warmup_on_write: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorOptions::default(),
            comparison_warn_threshold: 250_000,
            filter_persisted_by_confidence: false,
            invalidate_warmup_on_write: true,
        }
    }
}
