//! # Collaborator Traits
//!
//! Implementations must be `Send + Sync` so they can be shared across
//! async tasks behind an `Arc`. The traits are object-safe to support
//! runtime backend selection (in-memory vs. Postgres).

use async_trait::async_trait;
use xwalk_core::{Control, ManualMappingWrite, MappingRecord, WarmupEntry};

use crate::error::StoreResult;

/// Read access to frameworks and their controls.
#[async_trait]
pub trait FrameworkCatalog: Send + Sync {
    /// Whether a framework with this id exists.
    async fn framework_exists(&self, framework_id: &str) -> StoreResult<bool>;

    /// All controls of one framework, in catalog order.
    async fn controls_in(&self, framework_id: &str) -> StoreResult<Vec<Control>>;

    /// All controls of every framework except `framework_id`, in catalog order.
    async fn controls_outside(&self, framework_id: &str) -> StoreResult<Vec<Control>>;

    /// A single control by id.
    async fn control(&self, control_id: &str) -> StoreResult<Option<Control>>;
}

/// Persisted mappings.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Mappings whose source control belongs to `source_framework_id`,
    /// optionally narrowed to targets in `target_framework_id`, joined with
    /// both controls and their evidence hints. Returned in stored order.
    async fn mappings_from(
        &self,
        source_framework_id: &str,
        target_framework_id: Option<&str>,
    ) -> StoreResult<Vec<MappingRecord>>;

    /// Upsert a manual mapping on `(source, target)` and replace its whole
    /// evidence-hint set. Must be atomic.
    async fn upsert_manual(&self, write: ManualMappingWrite) -> StoreResult<MappingRecord>;

    /// Delete the mapping for `(source, target)` together with its hints.
    /// Returns `false` when no such mapping exists.
    async fn delete_mapping(
        &self,
        source_control_id: &str,
        target_control_id: &str,
    ) -> StoreResult<bool>;
}

/// Precomputed crosswalk payloads, read-through only.
#[async_trait]
pub trait WarmupCache: Send + Sync {
    /// The cached entry for `framework_id`, if one has been built.
    async fn warmup(&self, framework_id: &str) -> StoreResult<Option<WarmupEntry>>;

    /// Drop the cached entry for `framework_id`. Missing entries are not an error.
    async fn invalidate(&self, framework_id: &str) -> StoreResult<()>;
}
