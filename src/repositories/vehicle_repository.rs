//! Repositorio de vehículos

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn find_by_telematics_id(
        &self,
        telematics_id: &str,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE telematics_id = $1")
                .bind(telematics_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    pub async fn vin_exists(&self, vin: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE vin = $1)")
                .bind(vin)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        vin: String,
        telematics_id: Option<String>,
        unit_number: Option<String>,
        make: String,
        model: String,
        year: i32,
        license_plate: Option<String>,
        status: String,
        mileage: Option<i32>,
        engine_hours: Option<Decimal>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, vin, telematics_id, unit_number, make, model, year,
                                  license_plate, status, mileage, engine_hours, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vin)
        .bind(telematics_id)
        .bind(unit_number)
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(license_plate)
        .bind(status)
        .bind(mileage)
        .bind(engine_hours)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        vin: Option<String>,
        telematics_id: Option<String>,
        unit_number: Option<String>,
        make: Option<String>,
        model: Option<String>,
        year: Option<i32>,
        license_plate: Option<String>,
        status: Option<String>,
        mileage: Option<i32>,
        engine_hours: Option<Decimal>,
    ) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vin = $2, telematics_id = $3, unit_number = $4, make = $5, model = $6,
                year = $7, license_plate = $8, status = $9, mileage = $10,
                engine_hours = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vin.unwrap_or(current.vin))
        .bind(telematics_id.or(current.telematics_id))
        .bind(unit_number.or(current.unit_number))
        .bind(make.unwrap_or(current.make))
        .bind(model.unwrap_or(current.model))
        .bind(year.unwrap_or(current.year))
        .bind(license_plate.or(current.license_plate))
        .bind(status.unwrap_or(current.status))
        .bind(mileage.or(current.mileage))
        .bind(engine_hours.or(current.engine_hours))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }

    /// Actualizar los campos de telemetría de un vehículo
    ///
    /// El caller ya aplicó la regla de ratchet; acá solo se persiste.
    pub async fn update_telemetry(
        &self,
        id: Uuid,
        mileage: Option<i32>,
        engine_hours: Option<Decimal>,
        unit_number: Option<String>,
        license_plate: Option<String>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET mileage = $2,
                engine_hours = $3,
                unit_number = COALESCE($4, unit_number),
                license_plate = COALESCE($5, license_plate),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(mileage)
        .bind(engine_hours)
        .bind(unit_number)
        .bind(license_plate)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Sellar el vehículo dentro de la transacción de completado:
    /// ratchet de millas/horas ya resuelto por el caller, más la fecha de
    /// último servicio.
    pub async fn apply_service_completion(
        conn: &mut PgConnection,
        id: Uuid,
        mileage: Option<i32>,
        engine_hours: Option<Decimal>,
        last_service_date: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET mileage = $2, engine_hours = $3, last_service_date = $4, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(mileage)
        .bind(engine_hours)
        .bind(last_service_date)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn count_by_status(&self, status: Option<&str>) -> Result<i64, AppError> {
        let count: (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM vehicles WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM vehicles")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count.0)
    }
}
