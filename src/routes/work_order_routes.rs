//! Rutas de órdenes de trabajo

use axum::{
    routing::{get, put},
    Router,
};

use crate::controllers::work_order_controller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(work_order_controller::list_work_orders)
                .post(work_order_controller::create_work_order),
        )
        .route("/:id", get(work_order_controller::get_work_order))
        .route(
            "/:id/status",
            put(work_order_controller::update_work_order_status),
        )
}
