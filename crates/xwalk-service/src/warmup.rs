//! # Warmup Cache Reader
//!
//! A cached payload is filtered, never re-ranked or regenerated. Both the
//! target-framework and confidence filters apply to every stored match,
//! whatever its origin.

use xwalk_core::{CrosswalkFilters, CrosswalkResponse, WarmupEntry};

/// Narrow a cached crosswalk to `filters`, echoing them in the response.
///
/// `generated_at` stays the payload's own timestamp so consumers can see
/// how old the cached data is.
pub fn filter_cached(
    entry: WarmupEntry,
    framework_id: &str,
    filters: CrosswalkFilters,
) -> CrosswalkResponse {
    let payload = entry.crosswalk_payload;
    let matches: Vec<_> = payload
        .matches
        .into_iter()
        .filter(|m| filters.admits(m))
        .collect();

    CrosswalkResponse {
        framework_id: framework_id.to_string(),
        generated_at: payload.generated_at,
        total: matches.len(),
        matches,
        filters,
    }
}
