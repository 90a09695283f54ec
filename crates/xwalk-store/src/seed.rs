//! # Catalog Seed Files
//!
//! A seed file describes frameworks, controls, shipped mappings, and
//! optional warmup payloads. JSON (`.json`) and YAML (`.yaml`, `.yml`)
//! are accepted:
//!
//! ```yaml
//! frameworks:
//!   - { id: nist-800-53-rev5, name: NIST SP 800-53 Rev. 5 }
//! controls:
//!   - id: ra-5
//!     frameworkId: nist-800-53-rev5
//!     title: Vulnerability Monitoring and Scanning
//!     family: Risk Assessment
//! mappings:
//!   - sourceControlId: ra-5
//!     targetControlId: cis-7-1
//!     confidence: 0.8
//! ```
//!
//! Seed mappings default to `origin: SEED`; their tags and hints go
//! through the same normalization and limits as curator input, and a
//! MANUAL row must still cross frameworks.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xwalk_core::{
    normalize_tags, trimmed_non_empty, Control, ControlMapping, EvidenceHintInput,
    EvidenceReuseHint, Framework, MappingOrigin, WarmupEntry, MAX_EVIDENCE_HINTS,
};

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryStore;

/// A mapping row as written in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedMapping {
    #[serde(default)]
    pub id: Option<String>,
    pub source_control_id: String,
    pub target_control_id: String,
    pub confidence: f64,
    #[serde(default = "default_seed_origin")]
    pub origin: MappingOrigin,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub evidence_hints: Vec<EvidenceHintInput>,
}

fn default_seed_origin() -> MappingOrigin {
    MappingOrigin::Seed
}

impl SeedMapping {
    fn into_mapping(self) -> StoreResult<ControlMapping> {
        if !xwalk_core::is_unit_interval(self.confidence) {
            return Err(StoreError::Seed(format!(
                "mapping {} -> {} has confidence {} outside [0, 1]",
                self.source_control_id, self.target_control_id, self.confidence
            )));
        }
        if self.origin == MappingOrigin::Algo {
            return Err(StoreError::Seed(format!(
                "mapping {} -> {} cannot be persisted with origin ALGO",
                self.source_control_id, self.target_control_id
            )));
        }
        if self.evidence_hints.len() > MAX_EVIDENCE_HINTS {
            return Err(StoreError::Seed(format!(
                "mapping {} -> {} has {} evidence hints, at most {MAX_EVIDENCE_HINTS} allowed",
                self.source_control_id,
                self.target_control_id,
                self.evidence_hints.len()
            )));
        }
        let mut evidence_hints = Vec::with_capacity(self.evidence_hints.len());
        for input in &self.evidence_hints {
            let draft = input.normalize();
            if draft.summary.is_empty() {
                return Err(StoreError::Seed(format!(
                    "mapping {} -> {} has an evidence hint with an empty summary",
                    self.source_control_id, self.target_control_id
                )));
            }
            if !xwalk_core::is_unit_interval(draft.score) {
                return Err(StoreError::Seed(format!(
                    "mapping {} -> {} has evidence hint score {} outside [0, 1]",
                    self.source_control_id, self.target_control_id, draft.score
                )));
            }
            evidence_hints.push(EvidenceReuseHint {
                id: Uuid::new_v4().to_string(),
                summary: draft.summary,
                rationale: draft.rationale,
                score: draft.score,
                evidence_id: draft.evidence_id,
            });
        }

        let now = Utc::now();
        Ok(ControlMapping {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            source_control_id: self.source_control_id,
            target_control_id: self.target_control_id,
            confidence: self.confidence,
            origin: self.origin,
            tags: normalize_tags(&self.tags),
            rationale: trimmed_non_empty(self.rationale.as_deref()),
            evidence_hints,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Parsed contents of a catalog seed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub mappings: Vec<SeedMapping>,
    #[serde(default)]
    pub warmup: Vec<WarmupEntry>,
}

impl CatalogSeed {
    /// Read a seed file, choosing the format from its extension.
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw),
            Some("json") => Self::from_json_str(&raw),
            other => Err(StoreError::Seed(format!(
                "unsupported seed file extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    pub fn from_json_str(raw: &str) -> StoreResult<Self> {
        serde_json::from_str(raw).map_err(|e| StoreError::Seed(e.to_string()))
    }

    pub fn from_yaml_str(raw: &str) -> StoreResult<Self> {
        serde_yaml::from_str(raw).map_err(|e| StoreError::Seed(e.to_string()))
    }

    /// Load everything into a fresh in-memory store, enforcing referential
    /// integrity and pair uniqueness.
    pub fn into_store(self) -> StoreResult<InMemoryStore> {
        let store = InMemoryStore::new();
        let (frameworks, controls, mappings, warmup) = (
            self.frameworks.len(),
            self.controls.len(),
            self.mappings.len(),
            self.warmup.len(),
        );
        for framework in self.frameworks {
            store.insert_framework(framework);
        }
        for control in self.controls {
            store.insert_control(control)?;
        }
        for mapping in self.mappings {
            store.insert_mapping(mapping.into_mapping()?)?;
        }
        for entry in self.warmup {
            store.put_warmup(entry);
        }
        tracing::info!(
            frameworks,
            controls,
            mappings,
            warmup,
            "catalog seed loaded"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
frameworks:
  - { id: nist, name: NIST 800-53 }
  - { id: cis, name: CIS v8 }
controls:
  - id: ia-2
    frameworkId: nist
    title: Identification and Authentication
    family: Identification and Authentication
  - id: cis-6-3
    frameworkId: cis
    title: Require MFA for Externally-Exposed Applications
    family: Access Control Management
mappings:
  - sourceControlId: ia-2
    targetControlId: cis-6-3
    confidence: 0.8
    tags: ["MFA ", "mfa", "Identity"]
    evidenceHints:
      - summary: " IdP MFA policy export "
"#;

    #[test]
    fn yaml_seed_loads_with_seed_origin_and_normalized_tags() {
        let seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        assert_eq!(seed.mappings[0].origin, MappingOrigin::Seed);
        let mapping = seed.mappings[0].clone().into_mapping().unwrap();
        assert_eq!(mapping.tags, vec!["mfa", "identity"]);
        assert_eq!(mapping.evidence_hints[0].summary, "IdP MFA policy export");
        assert_eq!(mapping.evidence_hints[0].score, 0.75);
    }

    #[test]
    fn seed_rejects_algo_origin_and_bad_confidence() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        let mut algo = seed.mappings[0].clone();
        algo.origin = MappingOrigin::Algo;
        assert!(matches!(algo.into_mapping(), Err(StoreError::Seed(_))));

        seed.mappings[0].confidence = 1.5;
        assert!(matches!(seed.into_store(), Err(StoreError::Seed(_))));
    }

    fn hint(summary: &str, score: Option<f64>) -> EvidenceHintInput {
        EvidenceHintInput {
            summary: summary.to_string(),
            score,
            ..Default::default()
        }
    }

    #[test]
    fn seed_rejects_too_many_hints() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        seed.mappings[0].evidence_hints = (0..=MAX_EVIDENCE_HINTS)
            .map(|i| hint(&format!("export {i}"), None))
            .collect();
        assert!(matches!(seed.into_store(), Err(StoreError::Seed(_))));
    }

    #[test]
    fn seed_rejects_blank_hint_summary() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        seed.mappings[0].evidence_hints.push(hint("   ", None));
        assert!(matches!(seed.into_store(), Err(StoreError::Seed(_))));
    }

    #[test]
    fn seed_rejects_hint_score_outside_unit_interval() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        seed.mappings[0].evidence_hints = vec![hint("IdP export", Some(7.0))];
        assert!(matches!(seed.into_store(), Err(StoreError::Seed(_))));
    }

    #[test]
    fn manual_seed_mapping_within_one_framework_fails_integrity() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        seed.controls.push(Control::new(
            "ac-2",
            "nist",
            "Account Management",
            "Access Control",
        ));
        seed.mappings[0].target_control_id = "ac-2".to_string();
        seed.mappings[0].origin = MappingOrigin::Manual;
        assert!(matches!(seed.clone().into_store(), Err(StoreError::Integrity(_))));

        seed.mappings[0].origin = MappingOrigin::Seed;
        assert_eq!(seed.into_store().unwrap().mapping_count(), 1);
    }

    #[test]
    fn seed_with_unknown_control_fails_integrity() {
        let mut seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        seed.mappings[0].target_control_id = "missing".to_string();
        assert!(matches!(seed.into_store(), Err(StoreError::Integrity(_))));
    }

    #[test]
    fn json_seed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let seed = CatalogSeed::from_yaml_str(YAML).unwrap();
        std::fs::write(&path, serde_json::to_string(&seed).unwrap()).unwrap();
        let loaded = CatalogSeed::from_path(&path).unwrap();
        assert_eq!(loaded.controls.len(), 2);
        let store = loaded.into_store().unwrap();
        assert_eq!(store.mapping_count(), 1);
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            CatalogSeed::from_path(&path),
            Err(StoreError::Seed(_))
        ));
    }
}
