mod devices;
mod hierarchy;
mod locations;
mod lookups;
mod periods;
mod tickets;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Naming hierarchy
        .route("/buildings", get(hierarchy::list_buildings))
        .route("/buildings/{id}/floors", get(hierarchy::list_floors))
        .route("/floors/{id}/areas", get(hierarchy::list_areas))
        .route("/areas/{id}/rooms", get(hierarchy::list_rooms))
        .route(
            "/hierarchy/{kind}/{id}",
            patch(hierarchy::rename).delete(hierarchy::delete),
        )
        // Locations
        .route(
            "/locations",
            get(locations::list_locations).post(locations::resolve_location),
        )
        .route(
            "/locations/{id}",
            get(locations::get_location)
                .put(locations::update_location)
                .delete(locations::delete_location),
        )
        // Lookup values
        .route(
            "/lookups/{kind}",
            get(lookups::list_values).post(lookups::create_value),
        )
        .route(
            "/lookups/{kind}/{id}",
            patch(lookups::rename_value).delete(lookups::delete_value),
        )
        .route("/models", get(lookups::list_models).post(lookups::create_model))
        .route("/models/{id}", delete(lookups::delete_model))
        // Devices
        .route("/devices", get(devices::list_devices).post(devices::create_device))
        .route(
            "/devices/{id}",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        // Tickets
        .route("/tickets", get(tickets::list_tickets).post(tickets::open_ticket))
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .patch(tickets::edit_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/{id}/close", post(tickets::close_ticket))
        // Periods
        .route("/periods", get(periods::list_periods))
        .route("/periods/active", get(periods::active_period))
        .route("/periods/{code}", put(periods::update_period))
}
