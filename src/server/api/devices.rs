use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::ListDevicesParams;
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, StoreOptionExt};
use crate::types::NewDevice;

pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDevicesParams>,
) -> impl IntoResponse {
    let page = state
        .store
        .list_devices(&params.filter(), params.page_request())?;
    Ok::<_, ApiError>(Json(PaginatedResponse::from(page)))
}

pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewDevice>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let device = store.create_device(&req)?;
    let view = store.get_device(device.id)?.or_not_found("Device not found")?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let view = state.store.get_device(id)?.or_not_found("Device not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NewDevice>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    store.update_device(id, &req)?;
    let view = store.get_device(id)?.or_not_found("Device not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.store.delete_device(id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
