//! Shared catalog fixture for service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use xwalk_core::{
    Control, ControlMapping, CrosswalkFilters, CrosswalkMatch, CrosswalkResponse, Framework,
    MappingOrigin, WarmupEntry,
};
use xwalk_service::{CrosswalkService, ServiceConfig};
use xwalk_store::InMemoryStore;

pub const NIST: &str = "nist-800-53-rev5";
pub const CIS: &str = "cis-v8";
pub const PCI: &str = "pci-dss-v4";
pub const ISO: &str = "iso-27001";

/// Three populated frameworks and one empty one.
pub fn store() -> InMemoryStore {
    let store = InMemoryStore::new();
    for (id, name) in [
        (NIST, "NIST SP 800-53 Rev. 5"),
        (CIS, "CIS Controls v8"),
        (PCI, "PCI DSS v4.0"),
        (ISO, "ISO/IEC 27001"),
    ] {
        store.insert_framework(Framework {
            id: id.to_string(),
            name: name.to_string(),
            version: None,
        });
    }

    let controls = [
        Control::new(
            "ra-5",
            NIST,
            "Vulnerability Monitoring and Scanning",
            "Vulnerability Management",
        )
        .with_description("Monitor and scan for vulnerabilities and remediate findings."),
        Control::new("ac-2", NIST, "Account Management", "Access Control")
            .with_description("Manage system accounts including creation, review, and removal."),
        Control::new(
            "cis-7-1",
            CIS,
            "Establish and Maintain a Vulnerability Management Process",
            "Continuous Vulnerability Management",
        )
        .with_description(
            "Establish and maintain a documented vulnerability management process covering scanning, reporting, and remediation.",
        ),
        Control::new(
            "cis-5-1",
            CIS,
            "Establish and Maintain an Inventory of Accounts",
            "Account Management",
        )
        .with_description("Maintain an inventory of all accounts managed in the enterprise."),
        Control::new(
            "pci-11-3",
            PCI,
            "Internal and External Vulnerability Scans",
            "Vulnerability Management",
        )
        .with_description("Internal and external vulnerability scans are performed regularly."),
    ];
    for control in controls {
        store.insert_control(control).expect("fixture control");
    }
    store
}

/// Persist a SEED mapping between two fixture controls.
pub fn seed_mapping(store: &InMemoryStore, source: &str, target: &str, confidence: f64) {
    let now = Utc::now();
    store
        .insert_mapping(ControlMapping {
            id: format!("seed-{source}-{target}"),
            source_control_id: source.to_string(),
            target_control_id: target.to_string(),
            confidence,
            origin: MappingOrigin::Seed,
            tags: vec!["vulnerability".to_string()],
            rationale: Some("curated baseline".to_string()),
            evidence_hints: Vec::new(),
            created_at: now,
            updated_at: now,
        })
        .expect("fixture mapping");
}

pub fn service(store: &InMemoryStore) -> CrosswalkService {
    service_with(store, ServiceConfig::default())
}

pub fn service_with(store: &InMemoryStore, config: ServiceConfig) -> CrosswalkService {
    CrosswalkService::from_store(Arc::new(store.clone()), config)
}

/// Store a warmup payload built from the live path of a cache-less service.
pub async fn warm(store: &InMemoryStore, framework_id: &str) -> CrosswalkResponse {
    let cold = CrosswalkService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ServiceConfig::default(),
    );
    let payload = cold
        .generate_crosswalk(framework_id, CrosswalkFilters::default())
        .await
        .expect("live crosswalk");
    store.put_warmup(WarmupEntry {
        framework_id: framework_id.to_string(),
        crosswalk_payload: payload.clone(),
        generated_at: payload.generated_at,
    });
    payload
}

pub fn find<'a>(matches: &'a [CrosswalkMatch], source: &str, target: &str) -> Option<&'a CrosswalkMatch> {
    matches
        .iter()
        .find(|m| m.source.id == source && m.target.id == target)
}

pub fn target_filter(framework_id: &str) -> CrosswalkFilters {
    CrosswalkFilters {
        target_framework_id: Some(framework_id.to_string()),
        min_confidence: None,
    }
}
