//! Modelo de órdenes de trabajo

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkOrder {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    /// Open, In-progress, Completed, Cancelled
    pub status: String,
    /// Low, Medium, High, Critical
    pub priority: String,
    pub description: String,
    pub reported_issue: Option<String>,
    pub diagnosis: Option<String>,
    pub resolution: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
