//! # Manual Mapping Curator
//!
//! Analyst-asserted mappings. Validation runs in a fixed order and stops
//! at the first failure:
//!
//! 1. source control exists and belongs to the path framework (`NotFound`)
//! 2. target control exists (`NotFound`)
//! 3. target framework differs from the path framework (`BadRequest`)
//! 4. confidence and evidence hints are well formed (`BadRequest`)
//!
//! A successful write replaces the mapping's confidence, rationale, tags,
//! and whole evidence-hint set, then drops the framework's warmup entry
//! when [`ServiceConfig::invalidate_warmup_on_write`](crate::ServiceConfig)
//! is set.

use serde::{Deserialize, Serialize};
use xwalk_core::{
    is_unit_interval, normalize_tags, trimmed_non_empty, Control, CrosswalkMatch,
    EvidenceHintDraft, EvidenceHintInput, ManualMappingWrite, MappingOrigin,
    DEFAULT_MANUAL_CONFIDENCE, MAX_EVIDENCE_HINTS,
};

use crate::crosswalk::CrosswalkService;
use crate::error::CrosswalkError;

/// Body of a manual mapping upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMappingRequest {
    pub source_control_id: String,
    pub target_control_id: String,
    /// Defaults to 0.9 when omitted.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub evidence_hints: Option<Vec<EvidenceHintInput>>,
}

impl ManualMappingRequest {
    /// Validate value ranges and normalize text into a store write.
    fn into_write(self) -> Result<ManualMappingWrite, CrosswalkError> {
        let confidence = self.confidence.unwrap_or(DEFAULT_MANUAL_CONFIDENCE);
        if !is_unit_interval(confidence) {
            return Err(CrosswalkError::BadRequest(format!(
                "confidence must be within [0, 1], got {confidence}"
            )));
        }

        let hints = self.evidence_hints.unwrap_or_default();
        if hints.len() > MAX_EVIDENCE_HINTS {
            return Err(CrosswalkError::BadRequest(format!(
                "at most {MAX_EVIDENCE_HINTS} evidence hints are allowed, got {}",
                hints.len()
            )));
        }
        let evidence_hints = hints
            .iter()
            .map(validate_hint)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ManualMappingWrite {
            source_control_id: self.source_control_id,
            target_control_id: self.target_control_id,
            confidence,
            rationale: trimmed_non_empty(self.rationale.as_deref()),
            tags: normalize_tags(self.tags.unwrap_or_default()),
            evidence_hints,
        })
    }
}

fn validate_hint(hint: &EvidenceHintInput) -> Result<EvidenceHintDraft, CrosswalkError> {
    let draft = hint.normalize();
    if draft.summary.is_empty() {
        return Err(CrosswalkError::BadRequest(
            "evidence hint summary must not be empty".to_string(),
        ));
    }
    if !is_unit_interval(draft.score) {
        return Err(CrosswalkError::BadRequest(format!(
            "evidence hint score must be within [0, 1], got {}",
            draft.score
        )));
    }
    Ok(draft)
}

impl CrosswalkService {
    /// Create or update the manual mapping for `(source, target)`.
    ///
    /// Returns the stored mapping rendered as a `mapped` match. Never
    /// consults the candidate generator.
    pub async fn upsert_manual_mapping(
        &self,
        framework_id: &str,
        request: ManualMappingRequest,
    ) -> Result<CrosswalkMatch, CrosswalkError> {
        self.source_in_framework(framework_id, &request.source_control_id)
            .await?;

        let target = self
            .catalog
            .control(&request.target_control_id)
            .await?
            .ok_or_else(|| {
                CrosswalkError::NotFound(format!(
                    "target control {}",
                    request.target_control_id
                ))
            })?;
        if target.framework_id == framework_id {
            return Err(CrosswalkError::BadRequest(
                "manual mappings must target a different framework".to_string(),
            ));
        }

        let write = request.into_write()?;
        let record = self.mappings.upsert_manual(write).await?;

        metrics::counter!("xwalk_manual_upserts_total").increment(1);
        tracing::info!(
            framework_id,
            source = %record.source.id,
            target = %record.target.id,
            confidence = record.mapping.confidence,
            origin = %record.mapping.origin,
            "manual mapping upserted"
        );

        self.invalidate_after_write(framework_id).await;
        Ok(CrosswalkMatch::from_record(&record))
    }

    /// Remove the MANUAL mapping for `(source, target)` along with its
    /// hints. Shipped SEED rows are never deleted through this path.
    ///
    /// # Errors
    ///
    /// [`CrosswalkError::NotFound`] when the source control is not part of
    /// `framework_id` or no mapping exists for the pair.
    /// [`CrosswalkError::BadRequest`] when the pair is persisted with an
    /// origin other than MANUAL.
    pub async fn delete_manual_mapping(
        &self,
        framework_id: &str,
        source_control_id: &str,
        target_control_id: &str,
    ) -> Result<(), CrosswalkError> {
        self.source_in_framework(framework_id, source_control_id)
            .await?;

        let origin = self
            .mappings
            .mappings_from(framework_id, None)
            .await?
            .into_iter()
            .find(|record| {
                record.mapping.source_control_id == source_control_id
                    && record.mapping.target_control_id == target_control_id
            })
            .map(|record| record.mapping.origin);
        match origin {
            None => {
                return Err(CrosswalkError::NotFound(format!(
                    "mapping {source_control_id} -> {target_control_id}"
                )))
            }
            Some(MappingOrigin::Manual) => {}
            Some(other) => {
                return Err(CrosswalkError::BadRequest(format!(
                    "mapping {source_control_id} -> {target_control_id} has origin {other}; \
                     only manual mappings can be deleted"
                )))
            }
        }

        if !self
            .mappings
            .delete_mapping(source_control_id, target_control_id)
            .await?
        {
            return Err(CrosswalkError::NotFound(format!(
                "mapping {source_control_id} -> {target_control_id}"
            )));
        }

        tracing::info!(
            framework_id,
            source = source_control_id,
            target = target_control_id,
            "manual mapping deleted"
        );
        self.invalidate_after_write(framework_id).await;
        Ok(())
    }

    async fn source_in_framework(
        &self,
        framework_id: &str,
        source_control_id: &str,
    ) -> Result<Control, CrosswalkError> {
        self.catalog
            .control(source_control_id)
            .await?
            .filter(|control| control.framework_id == framework_id)
            .ok_or_else(|| {
                CrosswalkError::NotFound(format!(
                    "source control {source_control_id} in framework {framework_id}"
                ))
            })
    }

    /// The write has already committed, so a failed invalidation is logged
    /// rather than surfaced.
    async fn invalidate_after_write(&self, framework_id: &str) {
        if !self.config.invalidate_warmup_on_write {
            return;
        }
        if let Some(cache) = &self.warmup {
            if let Err(err) = cache.invalidate(framework_id).await {
                tracing::error!(framework_id, error = %err, "warmup invalidation failed");
            }
        }
    }
}
