//! # Crosswalk Generation
//!
//! Serves the warmup payload when the cache has one, otherwise merges the
//! framework's persisted mappings with transient suggestions from the
//! candidate generator.
//!
//! ## Live Path
//!
//! 1. Persisted mappings from the framework (narrowed to the target
//!    framework when requested) become `mapped` matches.
//! 2. The generator ranks source controls against the target set: one
//!    framework when requested, every other framework otherwise.
//! 3. Suggestions whose `(source, target)` pair is already persisted are
//!    dropped. The rest become `suggested` matches with origin `ALGO`.
//! 4. Everything is sorted by descending confidence, stably.
//!
//! The `minConfidence` floor is compared against the four-decimal score.
//! Suggestions then expose a three-decimal `confidence`, which can land just
//! below the requested floor (0.5774 passes `minConfidence=0.5774` and is
//! reported as 0.577). `similarityBreakdown.score` keeps the compared value.
//!
//! The pairwise cost is `|sources| × |targets|`. Above
//! [`ServiceConfig::comparison_warn_threshold`] a warning is logged; the
//! request still runs to completion.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use xwalk_core::{
    is_unit_interval, round_to, ControlReference, CrosswalkFilters, CrosswalkMatch,
    CrosswalkResponse, MappingOrigin, MatchStatus, SimilarityBreakdown,
};
use xwalk_engine::{Candidate, CandidateGenerator, GeneratorOptions};
use xwalk_store::{FrameworkCatalog, MappingStore, WarmupCache};

use crate::config::ServiceConfig;
use crate::error::CrosswalkError;
use crate::warmup;

/// Decimal places of confidence exposed on suggested matches.
const EXPOSED_PRECISION: u32 = 3;

/// Shared terms copied into a suggestion's tags.
const SUGGESTION_TAGS: usize = 3;

/// Crosswalk orchestration over the catalog, mapping, and warmup
/// collaborators.
#[derive(Clone)]
pub struct CrosswalkService {
    pub(crate) catalog: Arc<dyn FrameworkCatalog>,
    pub(crate) mappings: Arc<dyn MappingStore>,
    pub(crate) warmup: Option<Arc<dyn WarmupCache>>,
    pub(crate) config: ServiceConfig,
}

impl std::fmt::Debug for CrosswalkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosswalkService")
            .field("warmup", &self.warmup.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CrosswalkService {
    /// A service without a warmup cache; every request takes the live path.
    pub fn new(
        catalog: Arc<dyn FrameworkCatalog>,
        mappings: Arc<dyn MappingStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            catalog,
            mappings,
            warmup: None,
            config,
        }
    }

    /// Attach a warmup cache.
    pub fn with_warmup(mut self, cache: Arc<dyn WarmupCache>) -> Self {
        self.warmup = Some(cache);
        self
    }

    /// Wire all three collaborators to one backend.
    pub fn from_store<S>(store: Arc<S>, config: ServiceConfig) -> Self
    where
        S: FrameworkCatalog + MappingStore + WarmupCache + 'static,
    {
        Self::new(store.clone(), store.clone(), config).with_warmup(store)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Produce the crosswalk for `framework_id`.
    ///
    /// # Errors
    ///
    /// - [`CrosswalkError::NotFound`] when the framework does not exist.
    /// - [`CrosswalkError::BadRequest`] when `minConfidence` is outside `[0, 1]`.
    /// - [`CrosswalkError::Store`] when a collaborator fails.
    pub async fn generate_crosswalk(
        &self,
        framework_id: &str,
        filters: CrosswalkFilters,
    ) -> Result<CrosswalkResponse, CrosswalkError> {
        if let Some(min) = filters.min_confidence {
            if !is_unit_interval(min) {
                return Err(CrosswalkError::BadRequest(format!(
                    "minConfidence must be within [0, 1], got {min}"
                )));
            }
        }

        if !self.catalog.framework_exists(framework_id).await? {
            return Err(CrosswalkError::NotFound(format!(
                "framework {framework_id}"
            )));
        }

        if let Some(cache) = &self.warmup {
            if let Some(entry) = cache.warmup(framework_id).await? {
                metrics::counter!("xwalk_crosswalk_requests_total", "source" => "warmup")
                    .increment(1);
                tracing::debug!(framework_id, "serving crosswalk from warmup cache");
                return Ok(warmup::filter_cached(entry, framework_id, filters));
            }
        }

        let started = Instant::now();
        let target_framework = filters.target_framework_id.as_deref();

        let persisted = self
            .mappings
            .mappings_from(framework_id, target_framework)
            .await?;
        let covered: HashSet<(&str, &str)> =
            persisted.iter().map(|record| record.mapping.pair()).collect();

        let mut matches: Vec<CrosswalkMatch> = persisted
            .iter()
            .map(CrosswalkMatch::from_record)
            .filter(|m| !self.config.filter_persisted_by_confidence || filters.admits_confidence(m))
            .collect();
        let mapped = matches.len();

        let sources = self.catalog.controls_in(framework_id).await?;
        let targets = match target_framework {
            Some(target) => self.catalog.controls_in(target).await?,
            None => self.catalog.controls_outside(framework_id).await?,
        };

        let options = GeneratorOptions {
            min_confidence: filters
                .min_confidence
                .unwrap_or(self.config.generator.min_confidence),
            ..self.config.generator
        };
        let generation = CandidateGenerator::new(options).generate(&sources, &targets);

        if generation.comparisons > self.config.comparison_warn_threshold {
            tracing::warn!(
                framework_id,
                sources = sources.len(),
                targets = targets.len(),
                comparisons = generation.comparisons,
                threshold = self.config.comparison_warn_threshold,
                "crosswalk generation exceeded comparison threshold"
            );
        }

        matches.extend(
            generation
                .candidates
                .iter()
                .filter(|c| !covered.contains(&(c.source.id.as_str(), c.target.id.as_str())))
                .map(suggestion),
        );
        let suggested = matches.len() - mapped;

        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let elapsed = started.elapsed();
        metrics::counter!("xwalk_crosswalk_requests_total", "source" => "live").increment(1);
        metrics::counter!("xwalk_suggestions_generated_total").increment(suggested as u64);
        metrics::histogram!("xwalk_crosswalk_generation_seconds").record(elapsed.as_secs_f64());
        tracing::info!(
            framework_id,
            mapped,
            suggested,
            comparisons = generation.comparisons,
            elapsed_ms = elapsed.as_millis() as u64,
            "crosswalk generated"
        );

        Ok(CrosswalkResponse {
            framework_id: framework_id.to_string(),
            generated_at: Utc::now(),
            total: matches.len(),
            matches,
            filters,
        })
    }
}

/// Render a generator candidate as a transient `suggested` match.
fn suggestion(candidate: &Candidate<'_>) -> CrosswalkMatch {
    let confidence = round_to(candidate.confidence, EXPOSED_PRECISION);
    let tags: Vec<String> = candidate
        .shared_terms
        .iter()
        .take(SUGGESTION_TAGS)
        .cloned()
        .collect();
    let rationale = suggestion_rationale(confidence, &tags);

    CrosswalkMatch {
        id: format!("suggested:{}:{}", candidate.source.id, candidate.target.id),
        source: ControlReference::from(candidate.source),
        target: ControlReference::from(candidate.target),
        confidence,
        origin: MappingOrigin::Algo,
        tags,
        rationale: Some(rationale),
        evidence_hints: Vec::new(),
        status: MatchStatus::Suggested,
        similarity_breakdown: Some(SimilarityBreakdown {
            score: candidate.confidence,
            matched_terms: candidate.shared_terms.clone(),
        }),
    }
}

fn suggestion_rationale(confidence: f64, tags: &[String]) -> String {
    let mut rationale = format!("Suggested by term-overlap similarity (score {confidence:.3})");
    if !tags.is_empty() {
        rationale.push_str("; shared terms: ");
        rationale.push_str(&tags.join(", "));
    }
    rationale
}
