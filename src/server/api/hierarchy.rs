use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::RenameRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::parse_hierarchy_kind;

pub async fn list_buildings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let buildings = state.store.list_buildings()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(buildings)))
}

pub async fn list_floors(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<i64>,
) -> impl IntoResponse {
    let floors = state.store.list_floors(building_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(floors)))
}

pub async fn list_areas(
    State(state): State<Arc<AppState>>,
    Path(floor_id): Path<i64>,
) -> impl IntoResponse {
    let areas = state.store.list_areas(floor_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(areas)))
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Path(area_id): Path<i64>,
) -> impl IntoResponse {
    let rooms = state.store.list_rooms(area_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(rooms)))
}

pub async fn rename(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(req): Json<RenameRequest>,
) -> impl IntoResponse {
    let kind = parse_hierarchy_kind(&kind)?;
    state.store.rename_hierarchy(kind, id, &req.name)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> impl IntoResponse {
    let kind = parse_hierarchy_kind(&kind)?;
    state.store.delete_hierarchy(kind, id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
