use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{CreateModelRequest, ListModelsParams, LookupValueRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::parse_lookup_kind;

pub async fn list_values(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> impl IntoResponse {
    let kind = parse_lookup_kind(&kind)?;
    let values = state.store.list_lookups(kind)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(values)))
}

pub async fn create_value(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(req): Json<LookupValueRequest>,
) -> impl IntoResponse {
    let kind = parse_lookup_kind(&kind)?;
    let value = state.store.create_lookup(kind, &req.value)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(value))))
}

pub async fn rename_value(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(req): Json<LookupValueRequest>,
) -> impl IntoResponse {
    let kind = parse_lookup_kind(&kind)?;
    let value = state.store.rename_lookup(kind, id, &req.value)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(value)))
}

pub async fn delete_value(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> impl IntoResponse {
    let kind = parse_lookup_kind(&kind)?;
    state.store.delete_lookup(kind, id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListModelsParams>,
) -> impl IntoResponse {
    let models = state.store.list_models(params.brand_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(models)))
}

pub async fn create_model(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateModelRequest>,
) -> impl IntoResponse {
    let model = state.store.create_model(req.brand_id, &req.value)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(model))))
}

pub async fn delete_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.store.delete_model(id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
