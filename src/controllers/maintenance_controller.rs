//! Controlador del ciclo de vida de asignaciones de mantenimiento
//!
//! Crear, listar, actualizar, completar y borrar asignaciones vehículo ×
//! template. El completado es atómico: checkpoint de la asignación,
//! ratchet del vehículo, orden de trabajo opcional y registro de actividad
//! viajan en una sola transacción.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::common::ApiResponse;
use crate::dto::maintenance_dto::{
    AssignmentFilters, AssignmentResponse, AssignmentVehicleSummary, AssignmentWithDetails,
    CreateAssignmentRequest, MaintenanceCompletionRequest, UpdateAssignmentRequest,
};
use crate::models::vehicle::{ratchet_engine_hours, ratchet_mileage};
use crate::repositories::activity_log_repository::ActivityLogRepository;
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::repositories::work_order_repository::WorkOrderRepository;
use crate::services::due_state::{classify, compute_due_state, Checkpoint, CurrentReading};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub async fn create_assignment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> AppResult<Json<ApiResponse<AssignmentResponse>>> {
    let vehicles = VehicleRepository::new(state.pool.clone());
    let vehicle = vehicles
        .find_by_id(payload.vehicle_id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &payload.vehicle_id.to_string()))?;

    let schedules = ScheduleRepository::new(state.pool.clone());
    let schedule = schedules
        .find_by_id(payload.schedule_id)
        .await?
        .ok_or_else(|| not_found_error("Maintenance schedule", &payload.schedule_id.to_string()))?;

    let assignments = AssignmentRepository::new(state.pool.clone());
    if assignments
        .find_pair(payload.vehicle_id, payload.schedule_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "This schedule is already assigned to the vehicle".to_string(),
        ));
    }

    let now = Utc::now();
    // Checkpoints omitidos: sembrar desde el estado actual del vehículo
    // (millas/horas) o desde ahora (calendario)
    let last = Checkpoint {
        date: payload.last_performed_date.or(Some(now)),
        mileage: payload.last_performed_mileage.or(vehicle.mileage),
        engine_hours: payload.last_performed_engine_hours.or(vehicle.engine_hours),
    };
    let current = CurrentReading {
        mileage: vehicle.mileage,
        engine_hours: vehicle.engine_hours,
    };
    let due = compute_due_state(&schedule, &last, &current, now);

    let assignment = assignments
        .create(
            payload.vehicle_id,
            payload.schedule_id,
            last.date,
            last.mileage,
            last.engine_hours,
            due.next_due_date,
            due.next_due_mileage,
            due.next_due_engine_hours,
        )
        .await?;

    log::info!(
        "📋 Asignación creada: {} para vehículo {}",
        schedule.name,
        vehicle.vin
    );

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record(
            "assignment_created",
            "assignment",
            Some(assignment.id),
            Some(format!("{} on {}", schedule.name, vehicle.vin)),
        )
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success(assignment)))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AssignmentResponse>>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    let assignment = assignments
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

    Ok(Json(ApiResponse::success(assignment)))
}

/// Listado con detalles y flags de vencimiento calculados al vuelo
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(filters): Query<AssignmentFilters>,
) -> AppResult<Json<ApiResponse<Vec<AssignmentWithDetails>>>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    let rows = assignments
        .list_with_details(
            filters.vehicle_id,
            filters.limit.unwrap_or(100).min(500),
            filters.offset.unwrap_or(0),
        )
        .await?;

    let now = Utc::now();
    let mut results = Vec::with_capacity(rows.len());
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

        if matches!(filters.overdue, Some(true)) && !flags.is_overdue {
            continue;
        }
        if matches!(filters.due_soon, Some(true)) && !flags.is_due_soon {
            continue;
        }

        results.push(AssignmentWithDetails {
            id: row.id,
            vehicle_id: row.vehicle_id,
            schedule_id: row.schedule_id,
            last_performed_date: row.last_performed_date,
            last_performed_mileage: row.last_performed_mileage,
            last_performed_engine_hours: row.last_performed_engine_hours,
            next_due_date: row.next_due_date,
            next_due_mileage: row.next_due_mileage,
            next_due_engine_hours: row.next_due_engine_hours,
            vehicle: AssignmentVehicleSummary {
                vehicle_id: row.vehicle_id,
                make: row.vehicle_make,
                model: row.vehicle_model,
                year: row.vehicle_year,
                vin: row.vehicle_vin,
                license_plate: row.vehicle_license_plate,
                mileage: row.vehicle_mileage,
                engine_hours: row.vehicle_engine_hours,
                status: row.vehicle_status,
            },
            schedule,
            is_overdue: flags.is_overdue,
            is_due_soon: flags.is_due_soon,
            severity: flags.severity,
        });
    }

    Ok(Json(ApiResponse::success(results)))
}

/// Actualizar los checkpoints de una asignación
///
/// Cada campo last_performed_* presente reemplaza su checkpoint y
/// recalcula solo su dimensión; las dimensiones no tocadas conservan su
/// próximo vencimiento almacenado.
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> AppResult<Json<ApiResponse<AssignmentResponse>>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    let assignment = assignments
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

    let schedules = ScheduleRepository::new(state.pool.clone());
    let schedule = schedules
        .find_by_id(assignment.schedule_id)
        .await?
        .ok_or_else(|| {
            not_found_error("Maintenance schedule", &assignment.schedule_id.to_string())
        })?;

    let vehicles = VehicleRepository::new(state.pool.clone());
    let vehicle = vehicles
        .find_by_id(assignment.vehicle_id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &assignment.vehicle_id.to_string()))?;

    let last = Checkpoint {
        date: payload.last_performed_date.or(assignment.last_performed_date),
        mileage: payload
            .last_performed_mileage
            .or(assignment.last_performed_mileage),
        engine_hours: payload
            .last_performed_engine_hours
            .or(assignment.last_performed_engine_hours),
    };
    let current = CurrentReading {
        mileage: vehicle.mileage,
        engine_hours: vehicle.engine_hours,
    };
    let due = compute_due_state(&schedule, &last, &current, Utc::now());

    // Recompute por dimensión: solo los checkpoints tocados mueven su
    // próximo vencimiento
    let next_due_date = if payload.last_performed_date.is_some() {
        due.next_due_date
    } else {
        assignment.next_due_date
    };
    let next_due_mileage = if payload.last_performed_mileage.is_some() {
        due.next_due_mileage
    } else {
        assignment.next_due_mileage
    };
    let next_due_engine_hours = if payload.last_performed_engine_hours.is_some() {
        due.next_due_engine_hours
    } else {
        assignment.next_due_engine_hours
    };

    let updated = assignments
        .update_checkpoints(
            id,
            last.date,
            last.mileage,
            last.engine_hours,
            next_due_date,
            next_due_mileage,
            next_due_engine_hours,
        )
        .await?;

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record("assignment_updated", "assignment", Some(id), None)
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success(updated)))
}

/// Completar una tarea de mantenimiento
///
/// Transacción única: avanza el checkpoint, aplica el ratchet sobre el
/// vehículo, sella la fecha de último servicio y opcionalmente registra
/// una orden de trabajo retroactiva ya completada.
pub async fn complete_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaintenanceCompletionRequest>,
) -> AppResult<Json<ApiResponse<AssignmentResponse>>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    let assignment = assignments
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

    let schedules = ScheduleRepository::new(state.pool.clone());
    let schedule = schedules
        .find_by_id(assignment.schedule_id)
        .await?
        .ok_or_else(|| {
            not_found_error("Maintenance schedule", &assignment.schedule_id.to_string())
        })?;

    let vehicles = VehicleRepository::new(state.pool.clone());
    let vehicle = vehicles
        .find_by_id(assignment.vehicle_id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &assignment.vehicle_id.to_string()))?;

    let completion_date = payload.completion_date.unwrap_or_else(Utc::now);

    // Lecturas del completado con ratchet contra el vehículo almacenado
    let mileage = ratchet_mileage(vehicle.mileage, payload.current_mileage);
    let engine_hours = ratchet_engine_hours(vehicle.engine_hours, payload.current_engine_hours);

    let last = Checkpoint {
        date: Some(completion_date),
        mileage: payload.current_mileage.or(mileage),
        engine_hours: payload.current_engine_hours.or(engine_hours),
    };
    let current = CurrentReading {
        mileage,
        engine_hours,
    };
    let due = compute_due_state(&schedule, &last, &current, completion_date);

    let mut tx = state.pool.begin().await?;

    let updated = AssignmentRepository::update_checkpoints_tx(
        &mut *tx,
        id,
        last.date,
        last.mileage,
        last.engine_hours,
        due.next_due_date,
        due.next_due_mileage,
        due.next_due_engine_hours,
    )
    .await?;

    VehicleRepository::apply_service_completion(
        &mut *tx,
        vehicle.id,
        mileage,
        engine_hours,
        completion_date,
    )
    .await?;

    if payload.create_work_order {
        let work_order = WorkOrderRepository::create_completed_tx(
            &mut *tx,
            vehicle.id,
            format!("Scheduled maintenance: {}", schedule.name),
            payload.notes.clone(),
            "Medium".to_string(),
            completion_date,
        )
        .await?;
        log::info!("🧾 Orden de trabajo retroactiva {} creada", work_order.id);
    }

    ActivityLogRepository::record_tx(
        &mut *tx,
        "maintenance_completed",
        "assignment",
        Some(id),
        Some(format!("{} on {}", schedule.name, vehicle.vin)),
    )
    .await?;

    tx.commit().await?;

    log::info!(
        "✅ Mantenimiento completado: {} para {}",
        schedule.name,
        vehicle.vin
    );
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let assignments = AssignmentRepository::new(state.pool.clone());
    assignments.delete(id).await?;

    log::info!("🗑️ Asignación eliminada: {}", id);

    let logs = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = logs
        .record("assignment_deleted", "assignment", Some(id), None)
        .await
    {
        log::warn!("⚠️ No se pudo registrar actividad: {}", e);
    }

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Assignment deleted".to_string(),
    )))
}
