//! Repositorio de órdenes de trabajo

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::work_order::WorkOrder;
use crate::utils::errors::AppError;

pub struct WorkOrderRepository {
    pool: PgPool,
}

impl WorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WorkOrder>, AppError> {
        let work_order = sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(work_order)
    }

    pub async fn find_all(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkOrder>, AppError> {
        let work_orders = if let Some(status) = status {
            sqlx::query_as::<_, WorkOrder>(
                r#"
                SELECT * FROM work_orders
                WHERE status = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, WorkOrder>(
                "SELECT * FROM work_orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(work_orders)
    }

    pub async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<WorkOrder>, AppError> {
        let work_orders = sqlx::query_as::<_, WorkOrder>(
            "SELECT * FROM work_orders WHERE vehicle_id = $1 ORDER BY created_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(work_orders)
    }

    /// Alta de una orden de trabajo: nace en estado Open
    pub async fn create(
        &self,
        vehicle_id: Uuid,
        description: String,
        priority: String,
        reported_issue: Option<String>,
    ) -> Result<WorkOrder, AppError> {
        let work_order = sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO work_orders
                (id, vehicle_id, status, priority, description, reported_issue,
                 created_at, updated_at)
            VALUES ($1, $2, 'Open', $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(priority)
        .bind(description)
        .bind(reported_issue)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(work_order)
    }

    /// Cambio de estado con merge de diagnóstico/resolución. Los timestamps
    /// de transición los decide el caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: String,
        diagnosis: Option<String>,
        resolution: Option<String>,
        start_date: Option<DateTime<Utc>>,
        completed_date: Option<DateTime<Utc>>,
    ) -> Result<WorkOrder, AppError> {
        let work_order = sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders
            SET status = $2,
                diagnosis = COALESCE($3, diagnosis),
                resolution = COALESCE($4, resolution),
                start_date = COALESCE($5, start_date),
                completed_date = COALESCE($6, completed_date),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(diagnosis)
        .bind(resolution)
        .bind(start_date)
        .bind(completed_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(work_order)
    }

    /// Registro retroactivo de una tarea ya realizada, dentro de la
    /// transacción de completado: nace en estado Completed
    #[allow(clippy::too_many_arguments)]
    pub async fn create_completed_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        description: String,
        resolution: Option<String>,
        priority: String,
        completed_date: DateTime<Utc>,
    ) -> Result<WorkOrder, AppError> {
        let work_order = sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO work_orders
                (id, vehicle_id, status, priority, description, resolution,
                 start_date, completed_date, created_at, updated_at)
            VALUES ($1, $2, 'Completed', $3, $4, $5, $6, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(priority)
        .bind(description)
        .bind(resolution)
        .bind(completed_date)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(work_order)
    }

    pub async fn count_open(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM work_orders WHERE status NOT IN ('Completed', 'Cancelled')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn count_open_critical(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM work_orders
            WHERE status NOT IN ('Completed', 'Cancelled') AND priority = 'Critical'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
