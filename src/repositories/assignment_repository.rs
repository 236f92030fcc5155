//! Repositorio de asignaciones vehículo × template
//!
//! Los campos next_due_* se persisten ya calculados; este repositorio no
//! conoce la aritmética de vencimientos, solo la guarda.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::maintenance::VehicleMaintenanceSchedule;
use crate::utils::errors::AppError;

/// Fila del listado con detalles: asignación + vehículo + template,
/// aplanada con alias de columnas
#[derive(Debug, FromRow)]
pub struct AssignmentDetailRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub schedule_id: Uuid,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub last_performed_mileage: Option<i32>,
    pub last_performed_engine_hours: Option<Decimal>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_due_mileage: Option<i32>,
    pub next_due_engine_hours: Option<Decimal>,

    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: i32,
    pub vehicle_vin: String,
    pub vehicle_license_plate: Option<String>,
    pub vehicle_mileage: Option<i32>,
    pub vehicle_engine_hours: Option<Decimal>,
    pub vehicle_status: String,

    pub schedule_name: String,
    pub schedule_description: Option<String>,
    pub schedule_is_mileage_based: bool,
    pub schedule_is_time_based: bool,
    pub schedule_is_engine_hours_based: bool,
    pub schedule_mileage_interval: Option<i32>,
    pub schedule_time_interval_days: Option<i32>,
    pub schedule_engine_hours_interval: Option<Decimal>,
    pub schedule_created_at: DateTime<Utc>,
    pub schedule_updated_at: DateTime<Utc>,
}

impl AssignmentDetailRow {
    /// Reconstruir el template embebido en la fila aplanada
    pub fn schedule(&self) -> crate::models::maintenance::MaintenanceSchedule {
        crate::models::maintenance::MaintenanceSchedule {
            id: self.schedule_id,
            name: self.schedule_name.clone(),
            description: self.schedule_description.clone(),
            is_mileage_based: self.schedule_is_mileage_based,
            is_time_based: self.schedule_is_time_based,
            is_engine_hours_based: self.schedule_is_engine_hours_based,
            mileage_interval: self.schedule_mileage_interval,
            time_interval_days: self.schedule_time_interval_days,
            engine_hours_interval: self.schedule_engine_hours_interval,
            created_at: self.schedule_created_at,
            updated_at: self.schedule_updated_at,
        }
    }

    /// Nombre legible del vehículo para alertas y dashboard
    pub fn vehicle_label(&self) -> String {
        format!(
            "{} {} {}",
            self.vehicle_year, self.vehicle_make, self.vehicle_model
        )
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT vms.id, vms.vehicle_id, vms.schedule_id,
           vms.last_performed_date, vms.last_performed_mileage, vms.last_performed_engine_hours,
           vms.next_due_date, vms.next_due_mileage, vms.next_due_engine_hours,
           v.make AS vehicle_make, v.model AS vehicle_model, v.year AS vehicle_year,
           v.vin AS vehicle_vin, v.license_plate AS vehicle_license_plate,
           v.mileage AS vehicle_mileage, v.engine_hours AS vehicle_engine_hours,
           v.status AS vehicle_status,
           s.name AS schedule_name, s.description AS schedule_description,
           s.is_mileage_based AS schedule_is_mileage_based,
           s.is_time_based AS schedule_is_time_based,
           s.is_engine_hours_based AS schedule_is_engine_hours_based,
           s.mileage_interval AS schedule_mileage_interval,
           s.time_interval_days AS schedule_time_interval_days,
           s.engine_hours_interval AS schedule_engine_hours_interval,
           s.created_at AS schedule_created_at, s.updated_at AS schedule_updated_at
    FROM vehicle_maintenance_schedules vms
    JOIN vehicles v ON v.id = vms.vehicle_id
    JOIN maintenance_schedules s ON s.id = vms.schedule_id
"#;

pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<VehicleMaintenanceSchedule>, AppError> {
        let assignment = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            "SELECT * FROM vehicle_maintenance_schedules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    /// Buscar por par (vehículo, template): el par es único
    pub async fn find_pair(
        &self,
        vehicle_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<Option<VehicleMaintenanceSchedule>, AppError> {
        let assignment = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            "SELECT * FROM vehicle_maintenance_schedules WHERE vehicle_id = $1 AND schedule_id = $2",
        )
        .bind(vehicle_id)
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn find_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<VehicleMaintenanceSchedule>, AppError> {
        let assignments = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            "SELECT * FROM vehicle_maintenance_schedules WHERE vehicle_id = $1 ORDER BY created_at",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        vehicle_id: Uuid,
        schedule_id: Uuid,
        last_performed_date: Option<DateTime<Utc>>,
        last_performed_mileage: Option<i32>,
        last_performed_engine_hours: Option<Decimal>,
        next_due_date: Option<DateTime<Utc>>,
        next_due_mileage: Option<i32>,
        next_due_engine_hours: Option<Decimal>,
    ) -> Result<VehicleMaintenanceSchedule, AppError> {
        let assignment = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            r#"
            INSERT INTO vehicle_maintenance_schedules
                (id, vehicle_id, schedule_id,
                 last_performed_date, last_performed_mileage, last_performed_engine_hours,
                 next_due_date, next_due_mileage, next_due_engine_hours,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(schedule_id)
        .bind(last_performed_date)
        .bind(last_performed_mileage)
        .bind(last_performed_engine_hours)
        .bind(next_due_date)
        .bind(next_due_mileage)
        .bind(next_due_engine_hours)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_checkpoints(
        &self,
        id: Uuid,
        last_performed_date: Option<DateTime<Utc>>,
        last_performed_mileage: Option<i32>,
        last_performed_engine_hours: Option<Decimal>,
        next_due_date: Option<DateTime<Utc>>,
        next_due_mileage: Option<i32>,
        next_due_engine_hours: Option<Decimal>,
    ) -> Result<VehicleMaintenanceSchedule, AppError> {
        let assignment = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            r#"
            UPDATE vehicle_maintenance_schedules
            SET last_performed_date = $2, last_performed_mileage = $3,
                last_performed_engine_hours = $4, next_due_date = $5,
                next_due_mileage = $6, next_due_engine_hours = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(last_performed_date)
        .bind(last_performed_mileage)
        .bind(last_performed_engine_hours)
        .bind(next_due_date)
        .bind(next_due_mileage)
        .bind(next_due_engine_hours)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    /// Variante transaccional del update de checkpoints, usada por el
    /// completado atómico
    #[allow(clippy::too_many_arguments)]
    pub async fn update_checkpoints_tx(
        conn: &mut PgConnection,
        id: Uuid,
        last_performed_date: Option<DateTime<Utc>>,
        last_performed_mileage: Option<i32>,
        last_performed_engine_hours: Option<Decimal>,
        next_due_date: Option<DateTime<Utc>>,
        next_due_mileage: Option<i32>,
        next_due_engine_hours: Option<Decimal>,
    ) -> Result<VehicleMaintenanceSchedule, AppError> {
        let assignment = sqlx::query_as::<_, VehicleMaintenanceSchedule>(
            r#"
            UPDATE vehicle_maintenance_schedules
            SET last_performed_date = $2, last_performed_mileage = $3,
                last_performed_engine_hours = $4, next_due_date = $5,
                next_due_mileage = $6, next_due_engine_hours = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(last_performed_date)
        .bind(last_performed_mileage)
        .bind(last_performed_engine_hours)
        .bind(next_due_date)
        .bind(next_due_mileage)
        .bind(next_due_engine_hours)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(assignment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicle_maintenance_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Assignment not found".to_string()));
        }

        Ok(())
    }

    /// Listado con detalles de vehículo y template, opcionalmente filtrado
    /// por vehículo. Los flags de vencimiento se calculan en memoria en la
    /// capa de arriba, así que acá no se filtra por ellos.
    pub async fn list_with_details(
        &self,
        vehicle_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AssignmentDetailRow>, AppError> {
        let rows = match vehicle_id {
            Some(vehicle_id) => {
                let sql = format!(
                    "{DETAIL_SELECT} WHERE vms.vehicle_id = $1 ORDER BY vms.created_at LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, AssignmentDetailRow>(&sql)
                    .bind(vehicle_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{DETAIL_SELECT} ORDER BY vms.created_at LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, AssignmentDetailRow>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    /// Todas las asignaciones con detalles, sin paginar: alimenta el
    /// dashboard y la bandeja de alertas
    pub async fn list_all_with_details(&self) -> Result<Vec<AssignmentDetailRow>, AppError> {
        let sql = format!("{DETAIL_SELECT} ORDER BY vms.created_at");
        let rows = sqlx::query_as::<_, AssignmentDetailRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
