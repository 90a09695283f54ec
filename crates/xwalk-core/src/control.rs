//! # Catalog Types
//!
//! Frameworks and their controls as served by the framework catalog.
//! The crosswalk engine reads them and never mutates them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A compliance framework (e.g. `nist-800-53-rev5`, `cis-v8`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single security control belonging to one framework.
///
/// Control identifiers are addressed globally by the mapping store, so the
/// catalog is expected to keep them unique across frameworks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: String,
    pub framework_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category label, e.g. "Access Control" or "Risk Assessment".
    #[serde(default)]
    pub family: String,
    /// Opaque key/value bag owned by the catalog.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Control {
    /// Build a control with no description and empty metadata.
    pub fn new(
        id: impl Into<String>,
        framework_id: impl Into<String>,
        title: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            framework_id: framework_id.into(),
            title: title.into(),
            description: None,
            family: family.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The textual fields fed to the tokenizer, in order, skipping absent ones.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.id.as_str()),
            Some(self.title.as_str()),
            self.description.as_deref(),
            Some(self.family.as_str()),
        ]
        .into_iter()
        .flatten()
    }
}
