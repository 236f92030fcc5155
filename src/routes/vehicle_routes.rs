//! Rutas de vehículos y sus códigos de diagnóstico

use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::vehicle_controller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(vehicle_controller::list_vehicles).post(vehicle_controller::create_vehicle),
        )
        .route(
            "/:id",
            get(vehicle_controller::get_vehicle)
                .put(vehicle_controller::update_vehicle)
                .delete(vehicle_controller::delete_vehicle),
        )
        .route(
            "/:id/diagnostics",
            get(vehicle_controller::list_vehicle_diagnostics),
        )
        .route(
            "/:id/work-orders",
            get(vehicle_controller::list_vehicle_work_orders),
        )
        .route(
            "/diagnostics/:id/resolve",
            post(vehicle_controller::resolve_diagnostic),
        )
}
