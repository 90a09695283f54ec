//! # xwalk-core — Foundational Types for the Control Crosswalk
//!
//! Defines the data model shared by every crate in the workspace. The
//! crosswalk engine matches security controls of one compliance framework
//! (NIST 800-53, CIS, PCI, ISO, custom) against controls of other
//! frameworks so evidence gathered once can be reused elsewhere.
//!
//! ## Key Types
//!
//! - [`Control`] / [`Framework`] — catalog rows, owned by the framework
//!   catalog and immutable from the engine's point of view.
//! - [`ControlMapping`] / [`EvidenceReuseHint`] — persisted mappings with
//!   their provenance ([`MappingOrigin`]).
//! - [`CrosswalkMatch`] — the single result shape for both persisted
//!   mappings and transient algorithmic suggestions.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `xwalk-*` crates (leaf of the DAG).
//! - No I/O and no `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod confidence;
pub mod control;
pub mod crosswalk;
pub mod mapping;

pub use confidence::{
    is_unit_interval, round_to, DEFAULT_HINT_SCORE, DEFAULT_MANUAL_CONFIDENCE,
};
pub use control::{Control, Framework};
pub use crosswalk::{
    ControlReference, CrosswalkFilters, CrosswalkMatch, CrosswalkResponse, MatchStatus,
    SimilarityBreakdown, WarmupEntry,
};
pub use mapping::{
    normalize_tags, trimmed_non_empty, ControlMapping, EvidenceHintDraft, EvidenceHintInput,
    EvidenceReuseHint, ManualMappingWrite, MappingOrigin, MappingRecord, MAX_EVIDENCE_HINTS,
    MAX_TAGS,
};
