//! # Service Errors
//!
//! Two caller-facing classes plus collaborator failures:
//!
//! - `NotFound` — unknown framework, unknown source control (or one outside
//!   the requested framework), unknown target control, missing mapping.
//! - `BadRequest` — a request that violates a curator rule, e.g. a manual
//!   mapping whose target sits in the source framework.
//! - `Store` — passed through from the collaborator untouched; no retries.

use thiserror::Error;
use xwalk_store::StoreError;

#[derive(Error, Debug)]
pub enum CrosswalkError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
