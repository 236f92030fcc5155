//! Rutas de templates y asignaciones de mantenimiento

use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::{maintenance_controller, schedule_controller};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/schedules",
            get(schedule_controller::list_schedules).post(schedule_controller::create_schedule),
        )
        .route(
            "/schedules/:id",
            get(schedule_controller::get_schedule)
                .put(schedule_controller::update_schedule)
                .delete(schedule_controller::delete_schedule),
        )
        .route(
            "/assignments",
            get(maintenance_controller::list_assignments)
                .post(maintenance_controller::create_assignment),
        )
        .route(
            "/assignments/:id",
            get(maintenance_controller::get_assignment)
                .put(maintenance_controller::update_assignment)
                .delete(maintenance_controller::delete_assignment),
        )
        .route(
            "/assignments/:id/complete",
            post(maintenance_controller::complete_assignment),
        )
}
