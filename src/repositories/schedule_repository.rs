//! Repositorio de templates de mantenimiento

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::maintenance::MaintenanceSchedule;
use crate::utils::errors::AppError;

pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceSchedule>, AppError> {
        let schedule = sqlx::query_as::<_, MaintenanceSchedule>(
            "SELECT * FROM maintenance_schedules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn find_all(&self) -> Result<Vec<MaintenanceSchedule>, AppError> {
        let schedules = sqlx::query_as::<_, MaintenanceSchedule>(
            "SELECT * FROM maintenance_schedules ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    /// Buscar un template por nombre normalizado (trim + minúsculas +
    /// espacios colapsados). Usado por el folding de defectos DVIR.
    pub async fn find_by_normalized_name(
        &self,
        normalized: &str,
    ) -> Result<Option<MaintenanceSchedule>, AppError> {
        let schedule = sqlx::query_as::<_, MaintenanceSchedule>(
            r#"
            SELECT * FROM maintenance_schedules
            WHERE lower(regexp_replace(btrim(name), '\s+', ' ', 'g')) = $1
            LIMIT 1
            "#,
        )
        .bind(normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        is_mileage_based: bool,
        is_time_based: bool,
        is_engine_hours_based: bool,
        mileage_interval: Option<i32>,
        time_interval_days: Option<i32>,
        engine_hours_interval: Option<Decimal>,
    ) -> Result<MaintenanceSchedule, AppError> {
        let schedule = sqlx::query_as::<_, MaintenanceSchedule>(
            r#"
            INSERT INTO maintenance_schedules
                (id, name, description, is_mileage_based, is_time_based, is_engine_hours_based,
                 mileage_interval, time_interval_days, engine_hours_interval, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(is_mileage_based)
        .bind(is_time_based)
        .bind(is_engine_hours_based)
        .bind(mileage_interval)
        .bind(time_interval_days)
        .bind(engine_hours_interval)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(schedule)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        is_mileage_based: Option<bool>,
        is_time_based: Option<bool>,
        is_engine_hours_based: Option<bool>,
        mileage_interval: Option<i32>,
        time_interval_days: Option<i32>,
        engine_hours_interval: Option<Decimal>,
    ) -> Result<MaintenanceSchedule, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Maintenance schedule not found".to_string()))?;

        let schedule = sqlx::query_as::<_, MaintenanceSchedule>(
            r#"
            UPDATE maintenance_schedules
            SET name = $2, description = $3, is_mileage_based = $4, is_time_based = $5,
                is_engine_hours_based = $6, mileage_interval = $7, time_interval_days = $8,
                engine_hours_interval = $9, updated_at = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name.unwrap_or(current.name))
        .bind(description.or(current.description))
        .bind(is_mileage_based.unwrap_or(current.is_mileage_based))
        .bind(is_time_based.unwrap_or(current.is_time_based))
        .bind(is_engine_hours_based.unwrap_or(current.is_engine_hours_based))
        .bind(mileage_interval.or(current.mileage_interval))
        .bind(time_interval_days.or(current.time_interval_days))
        .bind(engine_hours_interval.or(current.engine_hours_interval))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM maintenance_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Maintenance schedule not found".to_string(),
            ));
        }

        Ok(())
    }

    /// Verificar si el template tiene asignaciones activas (guard del delete)
    pub async fn has_assignments(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicle_maintenance_schedules WHERE schedule_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
