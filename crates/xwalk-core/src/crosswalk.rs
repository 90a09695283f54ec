//! # Crosswalk Result Types
//!
//! [`CrosswalkMatch`] is the one result shape returned to consumers,
//! whether the match comes from a persisted mapping (`status = mapped`)
//! or from the candidate generator (`status = suggested`). Matches are
//! never stored; they are produced per request or read from the warmup
//! cache.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::control::Control;
use crate::mapping::{EvidenceReuseHint, MappingOrigin, MappingRecord};

/// Lightweight view of a control embedded in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlReference {
    pub id: String,
    pub framework_id: String,
    pub title: String,
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl From<&Control> for ControlReference {
    fn from(control: &Control) -> Self {
        Self {
            id: control.id.clone(),
            framework_id: control.framework_id.clone(),
            title: control.title.clone(),
            family: control.family.clone(),
            metadata: (!control.metadata.is_empty()).then(|| control.metadata.clone()),
        }
    }
}

/// Whether a match is backed by a persisted mapping or only suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Mapped,
    Suggested,
}

/// Explanation of an algorithmic score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityBreakdown {
    /// Cosine similarity at generation precision (four decimals).
    pub score: f64,
    /// Alphabetically sorted shared terms, at most ten.
    pub matched_terms: Vec<String>,
}

/// A single crosswalk entry between a source and a target control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswalkMatch {
    pub id: String,
    pub source: ControlReference,
    pub target: ControlReference,
    pub confidence: f64,
    pub origin: MappingOrigin,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub evidence_hints: Vec<EvidenceReuseHint>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_breakdown: Option<SimilarityBreakdown>,
}

impl CrosswalkMatch {
    /// Render a persisted mapping as a `mapped` match.
    pub fn from_record(record: &MappingRecord) -> Self {
        let mapping = &record.mapping;
        Self {
            id: mapping.id.clone(),
            source: ControlReference::from(&record.source),
            target: ControlReference::from(&record.target),
            confidence: mapping.confidence,
            origin: mapping.origin,
            tags: mapping.tags.clone(),
            rationale: mapping.rationale.clone(),
            evidence_hints: mapping.evidence_hints.clone(),
            status: MatchStatus::Mapped,
            similarity_breakdown: None,
        }
    }

    /// The `(source, target)` pair identifying this match.
    pub fn pair(&self) -> (&str, &str) {
        (&self.source.id, &self.target.id)
    }
}

/// Optional narrowing of a crosswalk request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswalkFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_framework_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
}

impl CrosswalkFilters {
    /// True when `m` passes both the target-framework and confidence filters.
    pub fn admits(&self, m: &CrosswalkMatch) -> bool {
        self.admits_target(m) && self.admits_confidence(m)
    }

    /// True when no target framework is requested or `m` targets it.
    pub fn admits_target(&self, m: &CrosswalkMatch) -> bool {
        self.target_framework_id
            .as_deref()
            .map_or(true, |fw| m.target.framework_id == fw)
    }

    /// True when no floor is requested or `m` meets it.
    pub fn admits_confidence(&self, m: &CrosswalkMatch) -> bool {
        self.min_confidence.map_or(true, |min| m.confidence >= min)
    }
}

/// Response of a crosswalk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswalkResponse {
    pub framework_id: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub matches: Vec<CrosswalkMatch>,
    pub filters: CrosswalkFilters,
}

/// Precomputed crosswalk payload for one framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmupEntry {
    pub framework_id: String,
    pub crosswalk_payload: CrosswalkResponse,
    pub generated_at: DateTime<Utc>,
}
