//! Controlador del dashboard
//!
//! Resumen de contadores de la flota, listado de mantenimiento vencido o
//! por vencer y la bandeja de alertas agregada.

use axum::{extract::State, Json};
use chrono::Utc;
use num_traits::ToPrimitive;

use crate::dto::common::ApiResponse;
use crate::dto::dashboard_dto::{AlertsResponse, DashboardSummary, MaintenanceDueItem};
use crate::models::activity_log::ActivityLog;
use crate::repositories::activity_log_repository::ActivityLogRepository;
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::part_repository::PartRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::work_order_repository::WorkOrderRepository;
use crate::services::alert_service::AlertService;
use crate::services::due_state::{classify, CurrentReading};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let vehicles = VehicleRepository::new(state.pool.clone());
    let work_orders = WorkOrderRepository::new(state.pool.clone());
    let parts = PartRepository::new(state.pool.clone());

    let total_vehicles = vehicles.count_by_status(None).await?;
    let active_vehicles = vehicles.count_by_status(Some("Active")).await?;
    let out_of_service_vehicles = vehicles.count_by_status(Some("Out of Service")).await?;
    let open_work_orders = work_orders.count_open().await?;
    let critical_work_orders = work_orders.count_open_critical().await?;
    let low_inventory_items = parts.count_low_stock().await?;
    let maintenance_due_count = collect_due_items(&state).await?.len() as i64;

    Ok(Json(ApiResponse::success(DashboardSummary {
        total_vehicles,
        active_vehicles,
        out_of_service_vehicles,
        open_work_orders,
        critical_work_orders,
        low_inventory_items,
        maintenance_due_count,
    })))
}

/// Asignaciones vencidas o por vencer, para la vista de mantenimiento
pub async fn maintenance_due(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<MaintenanceDueItem>>>> {
    let items = collect_due_items(&state).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Bandeja de alertas: transitoria, recalculada en cada request
pub async fn alerts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AlertsResponse>>> {
    let service = AlertService::new(state.pool.clone());
    let response = service.collect().await?;

    Ok(Json(ApiResponse::success(response)))
}

/// Últimas acciones de negocio registradas
pub async fn recent_activity(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ActivityLog>>>> {
    let logs = ActivityLogRepository::new(state.pool.clone());
    let entries = logs.find_recent(50).await?;

    Ok(Json(ApiResponse::success(entries)))
}

async fn collect_due_items(state: &AppState) -> AppResult<Vec<MaintenanceDueItem>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    let rows = assignments.list_all_with_details().await?;
    let now = Utc::now();

    let mut items = Vec::new();
    for row in rows {
        let schedule = row.schedule();
        let current = CurrentReading {
            mileage: row.vehicle_mileage,
            engine_hours: row.vehicle_engine_hours,
        };
        let flags = classify(
            &schedule,
            row.next_due_date,
            row.next_due_mileage,
            row.next_due_engine_hours,
            &current,
            now,
        );

        if !flags.is_overdue && !flags.is_due_soon {
            continue;
        }

        let priority = match flags.severity {
            Some(severity) => severity.as_str().to_string(),
            // Por vencer pero todavía no vencida
            None => "Low".to_string(),
        };

        items.push(MaintenanceDueItem {
            vehicle_id: row.vehicle_id,
            vehicle_name: row.vehicle_label(),
            vin: row.vehicle_vin.clone(),
            service: schedule.name,
            due_miles: row.next_due_mileage,
            due_date: row.next_due_date,
            due_engine_hours: row.next_due_engine_hours.and_then(|h| h.to_f64()),
            priority,
        });
    }

    Ok(items)
}
