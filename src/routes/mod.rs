//! Definición de rutas de la API

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod dashboard_routes;
pub mod maintenance_routes;
pub mod part_routes;
pub mod telematics_routes;
pub mod vehicle_routes;
pub mod work_order_routes;

/// Armar el router completo de la aplicación
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/vehicles", vehicle_routes::router())
        .nest("/api/maintenance", maintenance_routes::router())
        .nest("/api/parts", part_routes::router())
        .nest("/api/work-orders", work_order_routes::router())
        .nest("/api/telematics", telematics_routes::router())
        .nest("/api/dashboard", dashboard_routes::router())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
