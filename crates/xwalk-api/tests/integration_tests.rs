//! # Integration Tests for xwalk-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot` against an
//! in-memory catalog: health probes, crosswalk generation, manual mapping
//! upsert and delete, error bodies, and the metrics endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use xwalk_api::AppState;
use xwalk_service::ServiceConfig;
use xwalk_store::CatalogSeed;

const CATALOG: &str = r#"{
  "frameworks": [
    { "id": "nist-800-53-rev5", "name": "NIST SP 800-53 Rev. 5" },
    { "id": "cis-v8", "name": "CIS Controls v8" }
  ],
  "controls": [
    {
      "id": "ra-5",
      "frameworkId": "nist-800-53-rev5",
      "title": "Vulnerability Monitoring and Scanning",
      "description": "Monitor and scan for vulnerabilities and remediate findings.",
      "family": "Vulnerability Management"
    },
    {
      "id": "ac-2",
      "frameworkId": "nist-800-53-rev5",
      "title": "Account Management",
      "family": "Access Control"
    },
    {
      "id": "cis-7-1",
      "frameworkId": "cis-v8",
      "title": "Establish and Maintain a Vulnerability Management Process",
      "description": "Establish and maintain a documented vulnerability management process covering scanning, reporting, and remediation.",
      "family": "Continuous Vulnerability Management"
    },
    {
      "id": "cis-5-1",
      "frameworkId": "cis-v8",
      "title": "Establish and Maintain an Inventory of Accounts",
      "family": "Account Management"
    }
  ],
  "mappings": [
    {
      "id": "seed-ac2-cis51",
      "sourceControlId": "ac-2",
      "targetControlId": "cis-5-1",
      "confidence": 0.8,
      "tags": ["Accounts"],
      "rationale": "Shipped baseline"
    }
  ]
}"#;

fn test_state() -> AppState {
    let store = CatalogSeed::from_json_str(CATALOG)
        .unwrap()
        .into_store()
        .unwrap();
    AppState::in_memory(store, ServiceConfig::default())
}

fn test_app() -> axum::Router {
    xwalk_api::app(test_state())
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_in_memory() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_absent_without_handle() {
    let response = test_app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_served_with_handle() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = xwalk_api::app(test_state().with_metrics(handle));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

// -- Crosswalk ----------------------------------------------------------------

#[tokio::test]
async fn test_crosswalk_merges_seed_and_suggestions() {
    let response = test_app()
        .oneshot(get("/v1/frameworks/nist-800-53-rev5/crosswalk"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["frameworkId"], "nist-800-53-rev5");
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(body["total"], matches.len());

    let seeded = matches
        .iter()
        .find(|m| m["id"] == "seed-ac2-cis51")
        .expect("seed mapping");
    assert_eq!(seeded["status"], "mapped");
    assert_eq!(seeded["origin"], "SEED");
    assert_eq!(seeded["tags"], json!(["accounts"]));

    let suggested = matches
        .iter()
        .find(|m| m["id"] == "suggested:ra-5:cis-7-1")
        .expect("suggestion");
    assert_eq!(suggested["status"], "suggested");
    assert_eq!(suggested["origin"], "ALGO");
    assert_eq!(suggested["confidence"], 0.475);
    assert_eq!(suggested["similarityBreakdown"]["score"], 0.4746);
    assert_eq!(suggested["source"]["frameworkId"], "nist-800-53-rev5");
    assert_eq!(suggested["target"]["frameworkId"], "cis-v8");
}

#[tokio::test]
async fn test_crosswalk_query_filters_echoed() {
    let response = test_app()
        .oneshot(get(
            "/v1/frameworks/nist-800-53-rev5/crosswalk?targetFrameworkId=cis-v8&minConfidence=0.9",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["filters"]["targetFrameworkId"], "cis-v8");
    assert_eq!(body["filters"]["minConfidence"], 0.9);
    // Persisted matches are not confidence-filtered on the live path.
    let ids: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["seed-ac2-cis51"]);
}

#[tokio::test]
async fn test_crosswalk_unknown_framework_returns_404() {
    let response = test_app()
        .oneshot(get("/v1/frameworks/sox/crosswalk"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_crosswalk_bad_query_returns_422() {
    let response = test_app()
        .oneshot(get(
            "/v1/frameworks/nist-800-53-rev5/crosswalk?minConfidence=high",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// -- Manual Mappings ----------------------------------------------------------

#[tokio::test]
async fn test_upsert_manual_mapping_returns_mapped_match() {
    let response = test_app()
        .oneshot(put_json(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings",
            json!({
                "sourceControlId": "ra-5",
                "targetControlId": "cis-7-1",
                "rationale": "  Same scanning obligation  ",
                "tags": ["Identity ", "MFA", "identity"],
                "evidenceHints": [{ "summary": "Quarterly scan report" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "mapped");
    assert_eq!(body["origin"], "MANUAL");
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["rationale"], "Same scanning obligation");
    assert_eq!(body["tags"], json!(["identity", "mfa"]));
    assert_eq!(body["evidenceHints"][0]["score"], 0.75);
    assert!(body.get("similarityBreakdown").is_none());
}

#[tokio::test]
async fn test_upsert_same_framework_target_returns_422() {
    let response = test_app()
        .oneshot(put_json(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings",
            json!({ "sourceControlId": "ra-5", "targetControlId": "ac-2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upsert_unknown_source_returns_404() {
    let response = test_app()
        .oneshot(put_json(
            "/v1/frameworks/cis-v8/crosswalk/mappings",
            json!({ "sourceControlId": "ra-5", "targetControlId": "cis-7-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upsert_malformed_body_returns_422() {
    let response = test_app()
        .oneshot(put_json(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings",
            json!({ "sourceControlId": "ra-5" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_manual_mapping_visible_in_crosswalk_then_deleted() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(put_json(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings",
            json!({ "sourceControlId": "ra-5", "targetControlId": "cis-7-1", "confidence": 0.95 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        app.clone()
            .oneshot(get("/v1/frameworks/nist-800-53-rev5/crosswalk"))
            .await
            .unwrap(),
    )
    .await;
    let first = &body["matches"][0];
    assert_eq!(first["source"]["id"], "ra-5");
    assert_eq!(first["target"]["id"], "cis-7-1");
    assert_eq!(first["status"], "mapped");
    assert_eq!(first["confidence"], 0.95);

    let response = app
        .clone()
        .oneshot(delete(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings/ra-5/cis-7-1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(delete(
            "/v1/frameworks/nist-800-53-rev5/crosswalk/mappings/ra-5/cis-7-1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
