//! Controlador de órdenes de trabajo
//!
//! CRUD mínimo: alta en estado Open, consulta y transición de estado. Las
//! órdenes retroactivas del completado de mantenimiento nacen por otra vía,
//! ya en estado Completed.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::work_order_dto::{
    CreateWorkOrderRequest, UpdateWorkOrderStatusRequest, WorkOrderFilters,
};
use crate::models::work_order::WorkOrder;
use crate::repositories::activity_log_repository::ActivityLogRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::work_order_repository::WorkOrderRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppResult};

const WORK_ORDER_STATUSES: [&str; 4] = ["Open", "In-progress", "Completed", "Cancelled"];

/// Validar que el estado pedido sea uno de los conocidos
pub fn validate_status(status: &str) -> AppResult<()> {
    if WORK_ORDER_STATUSES.contains(&status) {
        return Ok(());
    }
    Err(validation_error(&format!(
        "Invalid work order status '{}', expected one of: {}",
        status,
        WORK_ORDER_STATUSES.join(", ")
    )))
}

/// Timestamps derivados de una transición de estado: pasar de Open a
/// In-progress estampa el inicio; llegar a Completed estampa el cierre
pub fn transition_dates(
    previous_status: &str,
    new_status: &str,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start_date = (previous_status == "Open" && new_status == "In-progress").then_some(now);
    let completed_date =
        (new_status == "Completed" && previous_status != "Completed").then_some(now);
    (start_date, completed_date)
}

pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(filters): Query<WorkOrderFilters>,
) -> AppResult<Json<ApiResponse<Vec<WorkOrder>>>> {
    if let Some(status) = filters.status.as_deref() {
        validate_status(status)?;
    }

    let repo = WorkOrderRepository::new(state.pool.clone());
    let work_orders = repo.find_all(filters.status.as_deref(), 100, 0).await?;

    Ok(Json(ApiResponse::success(work_orders)))
}

pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WorkOrder>>> {
    let repo = WorkOrderRepository::new(state.pool.clone());
    let work_order = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Work order", &id.to_string()))?;

    Ok(Json(ApiResponse::success(work_order)))
}

pub async fn create_work_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkOrderRequest>,
) -> AppResult<Json<ApiResponse<WorkOrder>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let vehicles = VehicleRepository::new(state.pool.clone());
    let vehicle = vehicles
        .find_by_id(payload.vehicle_id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &payload.vehicle_id.to_string()))?;

    let priority = payload.priority.unwrap_or_else(|| "Medium".to_string());
    let repo = WorkOrderRepository::new(state.pool.clone());
    let work_order = repo
        .create(
            vehicle.id,
            payload.description,
            priority,
            payload.reported_issue,
        )
        .await?;

    log::info!(
        "🔧 Orden de trabajo creada para {}: {}",
        vehicle.vin,
        work_order.description
    );

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record(
            "work_order_created",
            "work_order",
            Some(work_order.id),
            Some(format!("{} on {}", work_order.description, vehicle.vin)),
        )
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success(work_order)))
}

pub async fn update_work_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<WorkOrder>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;
    validate_status(&payload.status)?;

    let repo = WorkOrderRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Work order", &id.to_string()))?;

    let (start_date, completed_date) =
        transition_dates(&existing.status, &payload.status, Utc::now());

    let work_order = repo
        .update_status(
            id,
            payload.status.clone(),
            payload.diagnosis,
            payload.resolution,
            start_date,
            completed_date,
        )
        .await?;

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record(
            "work_order_status_updated",
            "work_order",
            Some(work_order.id),
            Some(format!("{} -> {}", existing.status, work_order.status)),
        )
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success(work_order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_status_accepts_known_statuses() {
        for status in WORK_ORDER_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_validate_status_rejects_unknown() {
        assert!(validate_status("Done").is_err());
        assert!(validate_status("open").is_err());
    }

    #[test]
    fn test_transition_to_in_progress_stamps_start() {
        let now = Utc::now();
        let (start, completed) = transition_dates("Open", "In-progress", now);
        assert_eq!(start, Some(now));
        assert_eq!(completed, None);
    }

    #[test]
    fn test_transition_to_completed_stamps_close() {
        let now = Utc::now();
        let (start, completed) = transition_dates("In-progress", "Completed", now);
        assert_eq!(start, None);
        assert_eq!(completed, Some(now));
    }

    #[test]
    fn test_same_status_stamps_nothing() {
        let now = Utc::now();
        let (start, completed) = transition_dates("Completed", "Completed", now);
        assert_eq!(start, None);
        assert_eq!(completed, None);
    }
}
