//! # Persisted Control Mappings
//!
//! A [`ControlMapping`] asserts that a source control and a target control
//! are equivalent enough to reuse evidence between them.
//!
//! ## Invariants
//!
//! - `(source_control_id, target_control_id)` is unique per store.
//! - `MappingOrigin::Manual` mappings never pair two controls of the same
//!   framework (enforced by the curator before anything is written).
//! - `tags` are trimmed, lowercase, deduplicated, and hold at most
//!   [`MAX_TAGS`] entries.
//! - A mapping carries at most [`MAX_EVIDENCE_HINTS`] evidence hints; the
//!   hint set is replaced wholesale on every manual update.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::DEFAULT_HINT_SCORE;
use crate::control::Control;

/// Maximum number of tags kept on a mapping.
pub const MAX_TAGS: usize = 10;

/// Maximum number of evidence reuse hints attached to a mapping.
pub const MAX_EVIDENCE_HINTS: usize = 5;

/// Provenance of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingOrigin {
    /// Shipped with the product catalog.
    Seed,
    /// Computed by the candidate generator; never persisted.
    Algo,
    /// Asserted by an analyst through the curator.
    Manual,
}

impl MappingOrigin {
    /// Storage representation, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "SEED",
            Self::Algo => "ALGO",
            Self::Manual => "MANUAL",
        }
    }

    /// Parse the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SEED" => Some(Self::Seed),
            "ALGO" => Some(Self::Algo),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for MappingOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer from a mapping to evidence that can be reused across it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceReuseHint {
    pub id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub score: f64,
    /// Weak back-reference into evidence storage; not owned by the mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_id: Option<String>,
}

/// A persisted mapping row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMapping {
    pub id: String,
    pub source_control_id: String,
    pub target_control_id: String,
    pub confidence: f64,
    pub origin: MappingOrigin,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub evidence_hints: Vec<EvidenceReuseHint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ControlMapping {
    /// The `(source, target)` key the store enforces uniqueness on.
    pub fn pair(&self) -> (&str, &str) {
        (&self.source_control_id, &self.target_control_id)
    }
}

/// A mapping joined with its source and target controls.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRecord {
    pub mapping: ControlMapping,
    pub source: Control,
    pub target: Control,
}

/// Evidence hint as supplied by a curator, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceHintInput {
    pub summary: String,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub evidence_id: Option<String>,
}

impl EvidenceHintInput {
    /// Trim text fields, drop blank rationales, and default the score.
    pub fn normalize(&self) -> EvidenceHintDraft {
        EvidenceHintDraft {
            summary: self.summary.trim().to_string(),
            rationale: trimmed_non_empty(self.rationale.as_deref()),
            score: self.score.unwrap_or(DEFAULT_HINT_SCORE),
            evidence_id: trimmed_non_empty(self.evidence_id.as_deref()),
        }
    }
}

/// Normalized evidence hint ready to be written; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceHintDraft {
    pub summary: String,
    pub rationale: Option<String>,
    pub score: f64,
    pub evidence_id: Option<String>,
}

/// Fully validated manual mapping write handed to the mapping store.
///
/// The store upserts on `(source_control_id, target_control_id)`: a new
/// row gets `MappingOrigin::Manual`; an existing row keeps its origin and
/// has confidence, rationale, tags, and the whole hint set overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualMappingWrite {
    pub source_control_id: String,
    pub target_control_id: String,
    pub confidence: f64,
    pub rationale: Option<String>,
    pub tags: Vec<String>,
    pub evidence_hints: Vec<EvidenceHintDraft>,
}

/// Trim, lowercase, and deduplicate tags, keeping first-seen order and at
/// most [`MAX_TAGS`] entries. Blank tags are dropped.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if tag.is_empty() || !seen.insert(tag.clone()) {
            continue;
        }
        out.push(tag);
        if out.len() == MAX_TAGS {
            break;
        }
    }
    out
}

/// Trim an optional string, mapping blanks to `None`.
pub fn trimmed_non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
