//! Repositorio de códigos de diagnóstico

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::diagnostic::DiagnosticCode;
use crate::utils::errors::AppError;

/// Código de diagnóstico con el contexto del vehículo, para las alertas
#[derive(Debug, FromRow)]
pub struct DiagnosticWithVehicle {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub reported_date: DateTime<Utc>,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_unit_number: Option<String>,
}

pub struct DiagnosticRepository {
    pool: PgPool,
}

impl DiagnosticRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DiagnosticCode>, AppError> {
        let diagnostic =
            sqlx::query_as::<_, DiagnosticCode>("SELECT * FROM diagnostic_codes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(diagnostic)
    }

    /// Clave natural de dedup: (vehículo, código) entre los no resueltos
    pub async fn find_unresolved_by_vehicle_and_code(
        &self,
        vehicle_id: Uuid,
        code: &str,
    ) -> Result<Option<DiagnosticCode>, AppError> {
        let diagnostic = sqlx::query_as::<_, DiagnosticCode>(
            r#"
            SELECT * FROM diagnostic_codes
            WHERE vehicle_id = $1 AND code = $2 AND resolved_date IS NULL
            LIMIT 1
            "#,
        )
        .bind(vehicle_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(diagnostic)
    }

    pub async fn create(
        &self,
        vehicle_id: Uuid,
        code: String,
        description: Option<String>,
        severity: Option<String>,
        reported_date: DateTime<Utc>,
    ) -> Result<DiagnosticCode, AppError> {
        let diagnostic = sqlx::query_as::<_, DiagnosticCode>(
            r#"
            INSERT INTO diagnostic_codes
                (id, vehicle_id, code, description, severity, reported_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(code)
        .bind(description)
        .bind(severity)
        .bind(reported_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(diagnostic)
    }

    pub async fn list_by_vehicle(
        &self,
        vehicle_id: Uuid,
        include_resolved: bool,
    ) -> Result<Vec<DiagnosticCode>, AppError> {
        let diagnostics = if include_resolved {
            sqlx::query_as::<_, DiagnosticCode>(
                "SELECT * FROM diagnostic_codes WHERE vehicle_id = $1 ORDER BY reported_date DESC",
            )
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, DiagnosticCode>(
                r#"
                SELECT * FROM diagnostic_codes
                WHERE vehicle_id = $1 AND resolved_date IS NULL
                ORDER BY reported_date DESC
                "#,
            )
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(diagnostics)
    }

    /// No resueltos ni vinculados a orden de trabajo, con su vehículo,
    /// acotados para la bandeja de alertas
    pub async fn find_unresolved_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<DiagnosticWithVehicle>, AppError> {
        let rows = sqlx::query_as::<_, DiagnosticWithVehicle>(
            r#"
            SELECT d.id, d.vehicle_id, d.code, d.description, d.severity, d.reported_date,
                   v.make AS vehicle_make, v.model AS vehicle_model,
                   v.unit_number AS vehicle_unit_number
            FROM diagnostic_codes d
            JOIN vehicles v ON v.id = d.vehicle_id
            WHERE d.resolved_date IS NULL AND d.work_order_id IS NULL
            ORDER BY d.reported_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn resolve(
        &self,
        id: Uuid,
        work_order_id: Option<Uuid>,
    ) -> Result<DiagnosticCode, AppError> {
        let diagnostic = sqlx::query_as::<_, DiagnosticCode>(
            r#"
            UPDATE diagnostic_codes
            SET resolved_date = $2, work_order_id = COALESCE($3, work_order_id), updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(work_order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(diagnostic)
    }
}
