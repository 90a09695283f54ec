//! # Candidate Generator
//!
//! For every usable source control, ranks every usable target control by
//! cosine similarity and keeps the best few above a confidence floor.
//!
//! ## Rules
//!
//! - Controls with no tokens are skipped on both sides.
//! - A target with the same id as the source is never ranked against it.
//! - Confidence is rounded to four decimals before the floor is applied,
//!   so every emitted candidate satisfies `confidence >= min_confidence`.
//! - Per source, candidates sort by descending confidence; ties keep the
//!   target input order. At most `max_suggestions_per_control` survive.
//! - `shared_terms` is the sorted intersection of both term sets, capped
//!   at [`MAX_SHARED_TERMS`].

use serde::{Deserialize, Serialize};
use xwalk_core::{round_to, Control};

use crate::similarity::cosine_similarity;
use crate::tokenizer::TokenizedControl;

/// Upper bound on shared terms reported per candidate.
pub const MAX_SHARED_TERMS: usize = 10;

/// Decimal places kept on generated confidence values.
pub const GENERATION_PRECISION: u32 = 4;

/// Tuning for candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    pub max_suggestions_per_control: usize,
    pub min_confidence: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_suggestions_per_control: 3,
            min_confidence: 0.35,
        }
    }
}

/// A ranked target suggestion for one source control.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub source: &'a Control,
    pub target: &'a Control,
    /// Cosine similarity rounded to four decimals.
    pub confidence: f64,
    pub shared_terms: Vec<String>,
}

/// Output of one generation run.
#[derive(Debug, Clone, Default)]
pub struct Generation<'a> {
    pub candidates: Vec<Candidate<'a>>,
    /// Number of pairwise similarity computations performed.
    pub comparisons: usize,
}

/// Ranks source controls against target controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateGenerator {
    options: GeneratorOptions,
}

impl CandidateGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Produce the top-N candidates per source control.
    pub fn generate<'a>(&self, sources: &'a [Control], targets: &'a [Control]) -> Generation<'a> {
        if sources.is_empty() || targets.is_empty() || self.options.max_suggestions_per_control == 0
        {
            return Generation::default();
        }

        let targets: Vec<TokenizedControl<'a>> = targets
            .iter()
            .map(TokenizedControl::new)
            .filter(|t| !t.is_empty())
            .collect();

        let mut generation = Generation::default();
        for source in sources.iter().map(TokenizedControl::new) {
            if source.is_empty() {
                continue;
            }

            let mut ranked: Vec<(f64, &TokenizedControl<'a>)> = Vec::new();
            for target in &targets {
                if target.control.id == source.control.id {
                    continue;
                }
                generation.comparisons += 1;
                let confidence = round_to(
                    cosine_similarity(&source.vector, &target.vector),
                    GENERATION_PRECISION,
                );
                if confidence >= self.options.min_confidence {
                    ranked.push((confidence, target));
                }
            }

            // Stable sort: equal scores keep target input order.
            ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
            ranked.truncate(self.options.max_suggestions_per_control);

            generation
                .candidates
                .extend(ranked.into_iter().map(|(confidence, target)| Candidate {
                    source: source.control,
                    target: target.control,
                    confidence,
                    shared_terms: source.shared_terms(target, MAX_SHARED_TERMS),
                }));
        }

        tracing::debug!(
            sources = sources.len(),
            targets = targets.len(),
            comparisons = generation.comparisons,
            candidates = generation.candidates.len(),
            "candidate generation complete"
        );
        generation
    }
}
