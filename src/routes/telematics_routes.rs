//! Rutas de sincronización con el proveedor de telemática

use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::sync_controller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", post(sync_controller::start_sync))
        .route("/sync/status", get(sync_controller::sync_status))
        .route("/sync/reset", post(sync_controller::reset_sync))
        .route("/vehicles/:id/stats", get(sync_controller::vehicle_stats))
        .route("/stats/feed", get(sync_controller::stats_feed))
        .route("/stats/history", get(sync_controller::stats_history))
}
