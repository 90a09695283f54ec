//! # xwalk-store — Crosswalk Collaborators
//!
//! The crosswalk engine owns no persistence. It consumes three narrow
//! interfaces, defined in [`traits`]:
//!
//! - [`FrameworkCatalog`] — framework existence and bulk control reads.
//! - [`MappingStore`] — persisted mapping reads joined with their controls
//!   and evidence hints, plus the atomic manual-mapping upsert and delete.
//! - [`WarmupCache`] — optional precomputed crosswalk payloads.
//!
//! ## Implementations
//!
//! | Type              | Backing                                  |
//! |-------------------|------------------------------------------|
//! | [`InMemoryStore`] | `parking_lot::RwLock`, optional seed file |
//! | [`PgStore`]       | PostgreSQL via SQLx, embedded migrations  |
//!
//! Both implement all three traits, so a single store can back a service.
//! Neither holds cross-request caches in process memory beyond the
//! in-memory store's own tables.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod seed;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use seed::{CatalogSeed, SeedMapping};
pub use traits::{FrameworkCatalog, MappingStore, WarmupCache};
