//! DTOs del dashboard y la bandeja de alertas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::alert::Alert;

/// Resumen de contadores del dashboard
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_vehicles: i64,
    pub active_vehicles: i64,
    pub out_of_service_vehicles: i64,
    pub open_work_orders: i64,
    pub critical_work_orders: i64,
    pub low_inventory_items: i64,
    pub maintenance_due_count: i64,
}

/// Ítem de mantenimiento vencido o por vencer
#[derive(Debug, Serialize)]
pub struct MaintenanceDueItem {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub vin: String,
    pub service: String,
    pub due_miles: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub due_engine_hours: Option<f64>,
    pub priority: String,
}

/// Conteos por categoría de la bandeja de alertas
#[derive(Debug, Serialize)]
pub struct AlertCounts {
    pub total: usize,
    pub diagnostic: usize,
    pub inventory: usize,
    pub maintenance: usize,
}

/// Bandeja de alertas: transitoria, recalculada en cada request
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub alert_counts: AlertCounts,
}

/// Request para resolver un código de diagnóstico
#[derive(Debug, Deserialize)]
pub struct ResolveDiagnosticRequest {
    /// Orden de trabajo a vincular; sin ella es resolución explícita
    pub work_order_id: Option<Uuid>,
}
