//! Repositorio del log de actividad
//!
//! Registro append-only de acciones de negocio. Un fallo al registrar no
//! debe voltear la operación que lo origina, por eso los callers suelen
//! loguear y seguir.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::activity_log::ActivityLog;
use crate::utils::errors::AppError;

pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: Option<String>,
    ) -> Result<ActivityLog, AppError> {
        let entry = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (id, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Variante transaccional, para registrar dentro del completado atómico
    pub async fn record_tx(
        conn: &mut PgConnection,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: Option<String>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn find_recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
