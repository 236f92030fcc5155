//! Estado explícito de las corridas de sincronización
//!
//! Reemplaza el escaneo de texto libre sobre el log de auditoría: cada
//! corrida es una fila con estado etiquetado y timestamps. El marcador
//! "una sola corrida en vuelo" es advisory: puede resetearse manualmente
//! si una corrida queda colgada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Estado de una corrida de sincronización
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    Running,
    Completed,
    Failed,
}

impl SyncRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncRunStatus::Running => "running",
            SyncRunStatus::Completed => "completed",
            SyncRunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncRunStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(SyncRunStatus::Running),
            "completed" => Ok(SyncRunStatus::Completed),
            "failed" => Ok(SyncRunStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncRun {
    pub id: Uuid,
    /// running, completed o failed (texto en la base)
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub vehicles_processed: i32,
    pub vehicles_failed: i32,
    pub created_count: i32,
    pub updated_count: i32,
    pub error: Option<String>,
}

impl SyncRun {
    pub fn is_running(&self) -> bool {
        self.status == SyncRunStatus::Running.as_str()
    }
}
