//! Rutas de inventario de repuestos

use axum::{routing::get, Router};

use crate::controllers::part_controller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(part_controller::list_parts).post(part_controller::create_part),
        )
        .route("/low-stock", get(part_controller::list_low_stock))
        .route(
            "/:id",
            get(part_controller::get_part)
                .put(part_controller::update_part)
                .delete(part_controller::delete_part),
        )
}
