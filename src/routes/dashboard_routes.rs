//! Rutas del dashboard

use axum::{routing::get, Router};

use crate::controllers::dashboard_controller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(dashboard_controller::dashboard_summary))
        .route(
            "/maintenance-due",
            get(dashboard_controller::maintenance_due),
        )
        .route("/alerts", get(dashboard_controller::alerts))
        .route("/activity", get(dashboard_controller::recent_activity))
}
