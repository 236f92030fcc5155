//! Modelo de códigos de diagnóstico
//!
//! La clave natural es (vehicle_id, code): la reconciliación solo crea un
//! registro nuevo si no existe uno sin resolver con el mismo código para
//! ese vehículo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiagnosticCode {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    /// Texto libre del proveedor; se parsea a Severity al agregar alertas
    pub severity: Option<String>,
    pub reported_date: DateTime<Utc>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub work_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
