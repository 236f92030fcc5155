//! Modelo de auditoría
//!
//! Cada create/update relevante (mutaciones de mantenimiento y
//! reconciliación de telemetría) escribe una fila estructurada aquí.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
