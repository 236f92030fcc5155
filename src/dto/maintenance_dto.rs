//! DTOs de mantenimiento
//!
//! Requests y responses para templates, asignaciones y completado de
//! tareas de mantenimiento.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::alert::Severity;
use crate::models::maintenance::{MaintenanceSchedule, VehicleMaintenanceSchedule};

/// Request para crear un template de mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub is_mileage_based: bool,
    #[serde(default)]
    pub is_time_based: bool,
    #[serde(default)]
    pub is_engine_hours_based: bool,

    #[validate(range(min = 1))]
    pub mileage_interval: Option<i32>,

    #[validate(range(min = 1))]
    pub time_interval_days: Option<i32>,

    pub engine_hours_interval: Option<Decimal>,
}

/// Request para actualizar un template
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub is_mileage_based: Option<bool>,
    pub is_time_based: Option<bool>,
    pub is_engine_hours_based: Option<bool>,

    #[validate(range(min = 1))]
    pub mileage_interval: Option<i32>,

    #[validate(range(min = 1))]
    pub time_interval_days: Option<i32>,

    pub engine_hours_interval: Option<Decimal>,
}

/// Request para asignar un template a un vehículo
///
/// Los checkpoints omitidos se siembran desde el estado actual del
/// vehículo (millas/horas) o desde "ahora" (calendario).
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub vehicle_id: Uuid,
    pub schedule_id: Uuid,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub last_performed_mileage: Option<i32>,
    pub last_performed_engine_hours: Option<Decimal>,
}

/// Request para actualizar una asignación
///
/// Cada campo last_performed_* presente recalcula solo su dimensión.
#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub last_performed_date: Option<DateTime<Utc>>,
    pub last_performed_mileage: Option<i32>,
    pub last_performed_engine_hours: Option<Decimal>,
}

/// Request para completar una tarea de mantenimiento
#[derive(Debug, Deserialize)]
pub struct MaintenanceCompletionRequest {
    pub completion_date: Option<DateTime<Utc>>,
    pub current_mileage: Option<i32>,
    pub current_engine_hours: Option<Decimal>,
    #[serde(default)]
    pub create_work_order: bool,
    pub notes: Option<String>,
}

/// Filtros para el listado de asignaciones
#[derive(Debug, Deserialize, Default)]
pub struct AssignmentFilters {
    pub vehicle_id: Option<Uuid>,
    pub due_soon: Option<bool>,
    pub overdue: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resumen de vehículo embebido en el listado de asignaciones
#[derive(Debug, Serialize)]
pub struct AssignmentVehicleSummary {
    pub vehicle_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
    pub status: String,
}

/// Asignación con detalles de vehículo y template, más los flags de
/// vencimiento calculados al momento del request
#[derive(Debug, Serialize)]
pub struct AssignmentWithDetails {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub schedule_id: Uuid,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub last_performed_mileage: Option<i32>,
    pub last_performed_engine_hours: Option<Decimal>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_due_mileage: Option<i32>,
    pub next_due_engine_hours: Option<Decimal>,
    pub vehicle: AssignmentVehicleSummary,
    pub schedule: MaintenanceSchedule,
    pub is_overdue: bool,
    pub is_due_soon: bool,
    pub severity: Option<Severity>,
}

/// Response de una asignación sin detalles embebidos
pub type AssignmentResponse = VehicleMaintenanceSchedule;
