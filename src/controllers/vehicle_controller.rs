//! Controlador de vehículos
//!
//! CRUD de vehículos más el listado y resolución de sus códigos de
//! diagnóstico.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::dashboard_dto::ResolveDiagnosticRequest;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::diagnostic::DiagnosticCode;
use crate::models::vehicle::Vehicle;
use crate::models::work_order::WorkOrder;
use crate::repositories::activity_log_repository::ActivityLogRepository;
use crate::repositories::diagnostic_repository::DiagnosticRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::work_order_repository::WorkOrderRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

#[derive(Debug, Deserialize, Default)]
pub struct ListVehiclesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListDiagnosticsQuery {
    #[serde(default)]
    pub include_resolved: bool,
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ListVehiclesQuery>,
) -> AppResult<Json<ApiResponse<Vec<Vehicle>>>> {
    let repo = VehicleRepository::new(state.pool.clone());
    let vehicles = repo
        .find_all(query.limit.unwrap_or(100).min(500), query.offset.unwrap_or(0))
        .await?;

    Ok(Json(ApiResponse::success(vehicles)))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let repo = VehicleRepository::new(state.pool.clone());
    let vehicle = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let repo = VehicleRepository::new(state.pool.clone());
    if repo.vin_exists(&payload.vin).await? {
        return Err(AppError::Conflict(format!(
            "A vehicle with VIN '{}' already exists",
            payload.vin
        )));
    }

    let vehicle = repo
        .create(
            payload.vin,
            payload.telematics_id,
            payload.unit_number,
            payload.make,
            payload.model,
            payload.year,
            payload.license_plate,
            payload.status.unwrap_or_else(|| "Active".to_string()),
            payload.mileage,
            payload.engine_hours,
        )
        .await?;

    log::info!("🚚 Vehículo creado: {} ({})", vehicle.vin, vehicle.id);

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record("vehicle_created", "vehicle", Some(vehicle.id), None)
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let repo = VehicleRepository::new(state.pool.clone());
    let vehicle = repo
        .update(
            id,
            payload.vin,
            payload.telematics_id,
            payload.unit_number,
            payload.make,
            payload.model,
            payload.year,
            payload.license_plate,
            payload.status,
            payload.mileage,
            payload.engine_hours,
        )
        .await?;

    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = VehicleRepository::new(state.pool.clone());
    repo.delete(id).await?;

    log::info!("🗑️ Vehículo eliminado: {}", id);
    Ok(Json(ApiResponse::success_with_message(
        (),
        "Vehicle deleted".to_string(),
    )))
}

pub async fn list_vehicle_diagnostics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListDiagnosticsQuery>,
) -> AppResult<Json<ApiResponse<Vec<DiagnosticCode>>>> {
    let vehicles = VehicleRepository::new(state.pool.clone());
    if vehicles.find_by_id(id).await?.is_none() {
        return Err(not_found_error("Vehicle", &id.to_string()));
    }

    let repo = DiagnosticRepository::new(state.pool.clone());
    let diagnostics = repo.list_by_vehicle(id, query.include_resolved).await?;

    Ok(Json(ApiResponse::success(diagnostics)))
}

pub async fn list_vehicle_work_orders(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<WorkOrder>>>> {
    let vehicles = VehicleRepository::new(state.pool.clone());
    if vehicles.find_by_id(id).await?.is_none() {
        return Err(not_found_error("Vehicle", &id.to_string()));
    }

    let repo = WorkOrderRepository::new(state.pool.clone());
    let work_orders = repo.find_by_vehicle(id).await?;

    Ok(Json(ApiResponse::success(work_orders)))
}

pub async fn resolve_diagnostic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveDiagnosticRequest>,
) -> AppResult<Json<ApiResponse<DiagnosticCode>>> {
    let repo = DiagnosticRepository::new(state.pool.clone());
    let diagnostic = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Diagnostic code", &id.to_string()))?;

    if diagnostic.resolved_date.is_some() {
        return Err(AppError::Conflict(
            "Diagnostic code is already resolved".to_string(),
        ));
    }

    let resolved = repo.resolve(id, payload.work_order_id).await?;
    log::info!("✅ Código {} resuelto", resolved.code);

    Ok(Json(ApiResponse::success(resolved)))
}
