//! Controlador de templates de mantenimiento
//!
//! La invariante estructural de los templates se valida acá, en la
//! frontera de escritura: al menos una dimensión habilitada y un intervalo
//! positivo por cada dimensión habilitada. La calculadora de vencimientos
//! asume templates ya válidos.

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::maintenance_dto::{CreateScheduleRequest, UpdateScheduleRequest};
use crate::models::maintenance::MaintenanceSchedule;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

/// Validar la configuración de dimensiones de un template
pub fn validate_dimensions(
    is_mileage_based: bool,
    is_time_based: bool,
    is_engine_hours_based: bool,
    mileage_interval: Option<i32>,
    time_interval_days: Option<i32>,
    engine_hours_interval: Option<Decimal>,
) -> AppResult<()> {
    if !is_mileage_based && !is_time_based && !is_engine_hours_based {
        return Err(AppError::Validation(
            "At least one interval dimension must be enabled".to_string(),
        ));
    }

    if is_mileage_based && !matches!(mileage_interval, Some(i) if i > 0) {
        return Err(AppError::Validation(
            "mileage_interval must be a positive number when mileage-based".to_string(),
        ));
    }

    if is_time_based && !matches!(time_interval_days, Some(d) if d > 0) {
        return Err(AppError::Validation(
            "time_interval_days must be a positive number when time-based".to_string(),
        ));
    }

    if is_engine_hours_based && !matches!(engine_hours_interval, Some(h) if h > Decimal::ZERO) {
        return Err(AppError::Validation(
            "engine_hours_interval must be a positive number when engine-hours-based".to_string(),
        ));
    }

    Ok(())
}

pub async fn list_schedules(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<MaintenanceSchedule>>>> {
    let repo = ScheduleRepository::new(state.pool.clone());
    let schedules = repo.find_all().await?;

    Ok(Json(ApiResponse::success(schedules)))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MaintenanceSchedule>>> {
    let repo = ScheduleRepository::new(state.pool.clone());
    let schedule = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Maintenance schedule", &id.to_string()))?;

    Ok(Json(ApiResponse::success(schedule)))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Json(payload): Json<CreateScheduleRequest>,
) -> AppResult<Json<ApiResponse<MaintenanceSchedule>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    validate_dimensions(
        payload.is_mileage_based,
        payload.is_time_based,
        payload.is_engine_hours_based,
        payload.mileage_interval,
        payload.time_interval_days,
        payload.engine_hours_interval,
    )?;

    let repo = ScheduleRepository::new(state.pool.clone());
    let schedule = repo
        .create(
            payload.name,
            payload.description,
            payload.is_mileage_based,
            payload.is_time_based,
            payload.is_engine_hours_based,
            payload.mileage_interval,
            payload.time_interval_days,
            payload.engine_hours_interval,
        )
        .await?;

    log::info!("🛠️ Template creado: {}", schedule.name);
    Ok(Json(ApiResponse::success(schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> AppResult<Json<ApiResponse<MaintenanceSchedule>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let repo = ScheduleRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Maintenance schedule", &id.to_string()))?;

    // Validar la configuración resultante del merge, no solo el payload
    validate_dimensions(
        payload.is_mileage_based.unwrap_or(current.is_mileage_based),
        payload.is_time_based.unwrap_or(current.is_time_based),
        payload
            .is_engine_hours_based
            .unwrap_or(current.is_engine_hours_based),
        payload.mileage_interval.or(current.mileage_interval),
        payload.time_interval_days.or(current.time_interval_days),
        payload
            .engine_hours_interval
            .or(current.engine_hours_interval),
    )?;

    let schedule = repo
        .update(
            id,
            payload.name,
            payload.description,
            payload.is_mileage_based,
            payload.is_time_based,
            payload.is_engine_hours_based,
            payload.mileage_interval,
            payload.time_interval_days,
            payload.engine_hours_interval,
        )
        .await?;

    Ok(Json(ApiResponse::success(schedule)))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = ScheduleRepository::new(state.pool.clone());

    if repo.find_by_id(id).await?.is_none() {
        return Err(not_found_error("Maintenance schedule", &id.to_string()));
    }

    // Guard: un template con asignaciones activas no se borra
    if repo.has_assignments(id).await? {
        return Err(AppError::Conflict(
            "Cannot delete a schedule with active vehicle assignments".to_string(),
        ));
    }

    repo.delete(id).await?;
    log::info!("🗑️ Template eliminado: {}", id);

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Maintenance schedule deleted".to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_least_one_dimension_required() {
        let result = validate_dimensions(false, false, false, None, None, None);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_enabled_dimension_requires_positive_interval() {
        assert!(validate_dimensions(true, false, false, None, None, None).is_err());
        assert!(validate_dimensions(true, false, false, Some(0), None, None).is_err());
        assert!(validate_dimensions(false, true, false, None, Some(-5), None).is_err());
        assert!(validate_dimensions(
            false,
            false,
            true,
            None,
            None,
            Some(Decimal::ZERO)
        )
        .is_err());
    }

    #[test]
    fn test_valid_configurations_pass() {
        assert!(validate_dimensions(true, false, false, Some(5000), None, None).is_ok());
        assert!(validate_dimensions(
            true,
            true,
            true,
            Some(5000),
            Some(90),
            Some(Decimal::from(250))
        )
        .is_ok());
        // Intervalo presente pero dimensión apagada: se ignora
        assert!(validate_dimensions(false, true, false, Some(0), Some(30), None).is_ok());
    }
}
