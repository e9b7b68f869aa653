use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{CloseTicketRequest, ListTicketsParams, OpenTicketRequest};
use crate::server::response::{ApiError, ApiResponse, PaginatedResponse, StoreOptionExt};
use crate::server::validation::parse_status_filter;
use crate::types::TicketEdit;

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> impl IntoResponse {
    let status = parse_status_filter(params.status.as_deref())?;
    let page = state
        .store
        .list_tickets(&params.filter(status), params.page_request())?;
    Ok::<_, ApiError>(Json(PaginatedResponse::from(page)))
}

pub async fn open_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenTicketRequest>,
) -> impl IntoResponse {
    let date_in = req
        .date_in
        .ok_or_else(|| ApiError::bad_request("date_in is required"))?;
    let ticket = state.store.open_ticket(
        req.device_id,
        date_in,
        req.details_in.as_deref(),
        state.today(),
    )?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(ticket))))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let view = state.store.get_ticket(id)?.or_not_found("Ticket not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn edit_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(edit): Json<TicketEdit>,
) -> impl IntoResponse {
    let ticket = state.store.edit_ticket(id, &edit, state.today())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(ticket)))
}

pub async fn close_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CloseTicketRequest>,
) -> impl IntoResponse {
    let date_out = req
        .date_out
        .ok_or_else(|| ApiError::bad_request("date_out is required"))?;
    let ticket = state
        .store
        .close_ticket(id, req.status, date_out, req.details_out.as_deref())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(ticket)))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.store.delete_ticket(id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
