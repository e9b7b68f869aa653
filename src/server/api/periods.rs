use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::UpdatePeriodRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};

pub async fn list_periods(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let periods = state.store.list_periods()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(periods)))
}

pub async fn active_period(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let period = state
        .store
        .active_period(state.today())?
        .or_not_found("No active period")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(period)))
}

pub async fn update_period(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<UpdatePeriodRequest>,
) -> impl IntoResponse {
    let period = state
        .store
        .update_period(&code, req.starts_on, req.ends_on, state.today())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(period)))
}
