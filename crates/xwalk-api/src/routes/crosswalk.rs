//! # Crosswalk API
//!
//! Crosswalk generation and manual mapping curation for one framework.
//! Handlers only translate HTTP to [`CrosswalkService`](xwalk_service::CrosswalkService)
//! calls; every rule lives in the service.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use xwalk_core::{CrosswalkFilters, CrosswalkMatch, CrosswalkResponse};
use xwalk_service::ManualMappingRequest;

use crate::error::{extract_json, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/frameworks/{framework_id}/crosswalk", get(get_crosswalk))
        .route(
            "/v1/frameworks/{framework_id}/crosswalk/mappings",
            put(upsert_mapping),
        )
        .route(
            "/v1/frameworks/{framework_id}/crosswalk/mappings/{source_control_id}/{target_control_id}",
            delete(delete_mapping),
        )
}

/// GET /v1/frameworks/{framework_id}/crosswalk — Mapped and suggested matches.
///
/// Query: `targetFrameworkId`, `minConfidence`.
async fn get_crosswalk(
    State(state): State<AppState>,
    Path(framework_id): Path<String>,
    query: Result<Query<CrosswalkFilters>, QueryRejection>,
) -> Result<Json<CrosswalkResponse>, AppError> {
    let Query(filters) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let response = state
        .service
        .generate_crosswalk(&framework_id, filters)
        .await?;
    Ok(Json(response))
}

/// PUT /v1/frameworks/{framework_id}/crosswalk/mappings — Upsert a manual mapping.
async fn upsert_mapping(
    State(state): State<AppState>,
    Path(framework_id): Path<String>,
    body: Result<Json<ManualMappingRequest>, JsonRejection>,
) -> Result<Json<CrosswalkMatch>, AppError> {
    let request = extract_json(body)?;
    let mapped = state
        .service
        .upsert_manual_mapping(&framework_id, request)
        .await?;
    Ok(Json(mapped))
}

/// DELETE /v1/frameworks/{framework_id}/crosswalk/mappings/{source}/{target}
async fn delete_mapping(
    State(state): State<AppState>,
    Path((framework_id, source_control_id, target_control_id)): Path<(String, String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .delete_manual_mapping(&framework_id, &source_control_id, &target_control_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
