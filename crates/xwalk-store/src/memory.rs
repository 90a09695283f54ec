//! # In-Memory Store
//!
//! Development and test backend for all three collaborator traits. State
//! lives behind one `parking_lot::RwLock`; cloning the store shares it.
//!
//! Controls and mappings keep insertion order, which is the order the
//! catalog and mapping reads return them in. The manual upsert runs
//! entirely under the write lock, so the mapping row and its hint set are
//! replaced as one unit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;
use xwalk_core::{
    Control, ControlMapping, EvidenceHintDraft, EvidenceReuseHint, Framework, ManualMappingWrite,
    MappingOrigin, MappingRecord, WarmupEntry,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{FrameworkCatalog, MappingStore, WarmupCache};

#[derive(Debug, Default)]
struct Inner {
    frameworks: BTreeMap<String, Framework>,
    controls: Vec<Control>,
    control_index: HashMap<String, usize>,
    mappings: Vec<ControlMapping>,
    warmup: HashMap<String, WarmupEntry>,
}

impl Inner {
    fn control(&self, id: &str) -> Option<&Control> {
        self.control_index.get(id).map(|&i| &self.controls[i])
    }

    fn mapping_position(&self, source: &str, target: &str) -> Option<usize> {
        self.mappings
            .iter()
            .position(|m| m.source_control_id == source && m.target_control_id == target)
    }

    fn record(&self, mapping: &ControlMapping) -> Option<MappingRecord> {
        let source = self.control(&mapping.source_control_id)?;
        let target = self.control(&mapping.target_control_id)?;
        Some(MappingRecord {
            mapping: mapping.clone(),
            source: source.clone(),
            target: target.clone(),
        })
    }
}

/// Shared in-memory catalog, mapping store, and warmup cache.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a framework.
    pub fn insert_framework(&self, framework: Framework) {
        self.inner
            .write()
            .frameworks
            .insert(framework.id.clone(), framework);
    }

    /// Register a control. Its framework must already exist; a control
    /// with the same id is replaced in place.
    pub fn insert_control(&self, control: Control) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.frameworks.contains_key(&control.framework_id) {
            return Err(StoreError::Integrity(format!(
                "control {} references unknown framework {}",
                control.id, control.framework_id
            )));
        }
        match inner.control_index.get(&control.id).copied() {
            Some(i) => inner.controls[i] = control,
            None => {
                let i = inner.controls.len();
                inner.control_index.insert(control.id.clone(), i);
                inner.controls.push(control);
            }
        }
        Ok(())
    }

    /// Insert a pre-built mapping (seed data). Both controls must exist, the
    /// `(source, target)` pair must be new, and a MANUAL mapping must link
    /// two different frameworks.
    pub fn insert_mapping(&self, mapping: ControlMapping) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let mut frameworks = Vec::with_capacity(2);
        for id in [&mapping.source_control_id, &mapping.target_control_id] {
            match inner.control(id) {
                Some(control) => frameworks.push(control.framework_id.as_str()),
                None => {
                    return Err(StoreError::Integrity(format!(
                        "mapping {} references unknown control {id}",
                        mapping.id
                    )))
                }
            }
        }
        if mapping.origin == MappingOrigin::Manual && frameworks[0] == frameworks[1] {
            return Err(StoreError::Integrity(format!(
                "manual mapping {} -> {} stays inside framework {}",
                mapping.source_control_id, mapping.target_control_id, frameworks[0]
            )));
        }
        if inner
            .mapping_position(&mapping.source_control_id, &mapping.target_control_id)
            .is_some()
        {
            return Err(StoreError::Integrity(format!(
                "duplicate mapping {} -> {}",
                mapping.source_control_id, mapping.target_control_id
            )));
        }
        inner.mappings.push(mapping);
        Ok(())
    }

    /// Store a precomputed crosswalk payload, replacing any previous one.
    pub fn put_warmup(&self, entry: WarmupEntry) {
        self.inner
            .write()
            .warmup
            .insert(entry.framework_id.clone(), entry);
    }

    /// Number of persisted mappings.
    pub fn mapping_count(&self) -> usize {
        self.inner.read().mappings.len()
    }
}

fn materialize_hints(drafts: Vec<EvidenceHintDraft>) -> Vec<EvidenceReuseHint> {
    drafts
        .into_iter()
        .map(|draft| EvidenceReuseHint {
            id: Uuid::new_v4().to_string(),
            summary: draft.summary,
            rationale: draft.rationale,
            score: draft.score,
            evidence_id: draft.evidence_id,
        })
        .collect()
}

#[async_trait]
impl FrameworkCatalog for InMemoryStore {
    async fn framework_exists(&self, framework_id: &str) -> StoreResult<bool> {
        Ok(self.inner.read().frameworks.contains_key(framework_id))
    }

    async fn controls_in(&self, framework_id: &str) -> StoreResult<Vec<Control>> {
        Ok(self
            .inner
            .read()
            .controls
            .iter()
            .filter(|c| c.framework_id == framework_id)
            .cloned()
            .collect())
    }

    async fn controls_outside(&self, framework_id: &str) -> StoreResult<Vec<Control>> {
        Ok(self
            .inner
            .read()
            .controls
            .iter()
            .filter(|c| c.framework_id != framework_id)
            .cloned()
            .collect())
    }

    async fn control(&self, control_id: &str) -> StoreResult<Option<Control>> {
        Ok(self.inner.read().control(control_id).cloned())
    }
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn mappings_from(
        &self,
        source_framework_id: &str,
        target_framework_id: Option<&str>,
    ) -> StoreResult<Vec<MappingRecord>> {
        let inner = self.inner.read();
        let mut records = Vec::new();
        for mapping in &inner.mappings {
            let Some(record) = inner.record(mapping) else {
                tracing::warn!(
                    mapping_id = %mapping.id,
                    "skipping mapping with dangling control reference"
                );
                continue;
            };
            if record.source.framework_id != source_framework_id {
                continue;
            }
            if target_framework_id.is_some_and(|fw| record.target.framework_id != fw) {
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    async fn upsert_manual(&self, write: ManualMappingWrite) -> StoreResult<MappingRecord> {
        let mut inner = self.inner.write();
        for id in [&write.source_control_id, &write.target_control_id] {
            if inner.control(id).is_none() {
                return Err(StoreError::Integrity(format!("unknown control {id}")));
            }
        }

        let now = Utc::now();
        let hints = materialize_hints(write.evidence_hints);
        let position =
            match inner.mapping_position(&write.source_control_id, &write.target_control_id) {
                Some(i) => {
                    let existing = &mut inner.mappings[i];
                    existing.confidence = write.confidence;
                    existing.rationale = write.rationale;
                    existing.tags = write.tags;
                    existing.evidence_hints = hints;
                    existing.updated_at = now;
                    i
                }
                None => {
                    inner.mappings.push(ControlMapping {
                        id: Uuid::new_v4().to_string(),
                        source_control_id: write.source_control_id,
                        target_control_id: write.target_control_id,
                        confidence: write.confidence,
                        origin: MappingOrigin::Manual,
                        tags: write.tags,
                        rationale: write.rationale,
                        evidence_hints: hints,
                        created_at: now,
                        updated_at: now,
                    });
                    inner.mappings.len() - 1
                }
            };

        inner
            .record(&inner.mappings[position])
            .ok_or_else(|| StoreError::Integrity("mapping controls vanished during upsert".into()))
    }

    async fn delete_mapping(
        &self,
        source_control_id: &str,
        target_control_id: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        match inner.mapping_position(source_control_id, target_control_id) {
            Some(i) => {
                inner.mappings.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl WarmupCache for InMemoryStore {
    async fn warmup(&self, framework_id: &str) -> StoreResult<Option<WarmupEntry>> {
        Ok(self.inner.read().warmup.get(framework_id).cloned())
    }

    async fn invalidate(&self, framework_id: &str) -> StoreResult<()> {
        self.inner.write().warmup.remove(framework_id);
        Ok(())
    }
}
