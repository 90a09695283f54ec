//! # xwalk-service — Crosswalk Orchestration
//!
//! Two operations over the collaborator traits from `xwalk-store`:
//!
//! - [`CrosswalkService::generate_crosswalk`] — serve a framework's
//!   crosswalk from the warmup cache when one exists; otherwise merge
//!   persisted mappings with fresh algorithmic suggestions.
//! - [`CrosswalkService::upsert_manual_mapping`] — validate and persist an
//!   analyst-asserted mapping. Never consults the generator.
//!
//! ## Merge Invariants
//!
//! - No two matches share a `(source.id, target.id)` pair: a suggestion is
//!   dropped whenever a persisted mapping already covers its pair.
//! - Matches sort by descending confidence with a stable sort. Persisted
//!   matches are appended first, so they precede equal-scored suggestions.
//! - Suggestions are transient. Nothing on the read path writes.
//!
//! ## State
//!
//! The service holds no index or cache of its own. Every call reads the
//! collaborators afresh, so concurrent requests never contend on it.

pub mod config;
pub mod crosswalk;
pub mod curator;
pub mod error;
pub mod warmup;

pub use config::ServiceConfig;
pub use crosswalk::CrosswalkService;
pub use curator::ManualMappingRequest;
pub use error::CrosswalkError;
