//! Modelos de mantenimiento
//!
//! Este módulo contiene el template de mantenimiento (MaintenanceSchedule)
//! y su asignación a un vehículo (VehicleMaintenanceSchedule). Un template
//! puede tener hasta tres dimensiones de intervalo activas a la vez
//! (millas, días de calendario, horas de motor); la primera que dispare
//! gobierna el estado de vencimiento.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Template de tarea de mantenimiento con intervalos independientes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceSchedule {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_mileage_based: bool,
    pub is_time_based: bool,
    pub is_engine_hours_based: bool,
    pub mileage_interval: Option<i32>,
    pub time_interval_days: Option<i32>,
    pub engine_hours_interval: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asignación vehículo × template (par único)
///
/// Los campos next_due_* se derivan siempre de last_performed_* más el
/// intervalo del template y se recalculan en cada mutación.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleMaintenanceSchedule {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub schedule_id: Uuid,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub last_performed_mileage: Option<i32>,
    pub last_performed_engine_hours: Option<Decimal>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_due_mileage: Option<i32>,
    pub next_due_engine_hours: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
