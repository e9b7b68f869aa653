use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::ResolveLocationRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::types::{HierarchyKind, Placement};

pub async fn list_locations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let locations = state.store.list_locations()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(locations)))
}

/// Finds or creates a location. Answers 201 when the location row is new.
pub async fn resolve_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveLocationRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let resolved = match &req {
        ResolveLocationRequest::Path(path) => store.resolve_location(path)?,
        ResolveLocationRequest::Placement(placement) => store.resolve_placement(placement)?,
    };

    let location = store
        .get_location(resolved.location_id)?
        .or_not_found("Location not found")?;
    let status = if resolved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok::<_, ApiError>((status, Json(ApiResponse::success(location))))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let location = state
        .store
        .get_location(id)?
        .or_not_found("Location not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(location)))
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(placement): Json<Placement>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    store.update_location(id, &placement)?;
    let location = store.get_location(id)?.or_not_found("Location not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(location)))
}

pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.store.delete_hierarchy(HierarchyKind::Location, id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
