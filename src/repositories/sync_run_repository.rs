//! Repositorio de corridas de sincronización
//!
//! Cada corrida de reconciliación contra el proveedor de telemática es
//! una fila con estado explícito (running | completed | failed). El guard
//! de corrida única consulta la última fila, no logs.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::sync_run::SyncRun;
use crate::utils::errors::AppError;

pub struct SyncRunRepository {
    pool: PgPool,
}

impl SyncRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_latest(&self) -> Result<Option<SyncRun>, AppError> {
        let run = sqlx::query_as::<_, SyncRun>(
            "SELECT * FROM sync_runs ORDER BY started_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn create_running(&self) -> Result<SyncRun, AppError> {
        let run = sqlx::query_as::<_, SyncRun>(
            r#"
            INSERT INTO sync_runs (id, status, started_at)
            VALUES ($1, 'running', $2)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn mark_completed(
        &self,
        id: Uuid,
        vehicles_processed: i32,
        vehicles_failed: i32,
        created_count: i32,
        updated_count: i32,
    ) -> Result<SyncRun, AppError> {
        let run = sqlx::query_as::<_, SyncRun>(
            r#"
            UPDATE sync_runs
            SET status = 'completed', finished_at = $2, vehicles_processed = $3,
                vehicles_failed = $4, created_count = $5, updated_count = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(vehicles_processed)
        .bind(vehicles_failed)
        .bind(created_count)
        .bind(updated_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn mark_failed(&self, id: Uuid, error: &str) -> Result<SyncRun, AppError> {
        let run = sqlx::query_as::<_, SyncRun>(
            r#"
            UPDATE sync_runs
            SET status = 'failed', finished_at = $2, error = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(error)
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    /// Forzar a failed toda corrida colgada en running (endpoint de reset)
    pub async fn fail_running_runs(&self, error: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_runs
            SET status = 'failed', finished_at = $1, error = $2
            WHERE status = 'running'
            "#,
        )
        .bind(Utc::now())
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
