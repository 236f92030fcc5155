//! Repositorio de inventario de repuestos

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::part::PartsInventory;
use crate::utils::errors::AppError;

pub struct PartRepository {
    pool: PgPool,
}

impl PartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PartsInventory>, AppError> {
        let part = sqlx::query_as::<_, PartsInventory>("SELECT * FROM parts_inventory WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(part)
    }

    pub async fn find_all(&self) -> Result<Vec<PartsInventory>, AppError> {
        let parts = sqlx::query_as::<_, PartsInventory>(
            "SELECT * FROM parts_inventory ORDER BY part_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(parts)
    }

    pub async fn part_number_exists(&self, part_number: &str) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM parts_inventory WHERE part_number = $1)",
        )
        .bind(part_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        part_number: String,
        name: String,
        description: Option<String>,
        category: Option<String>,
        location: Option<String>,
        unit_cost: Option<Decimal>,
        quantity_on_hand: i32,
        minimum_quantity: i32,
    ) -> Result<PartsInventory, AppError> {
        let part = sqlx::query_as::<_, PartsInventory>(
            r#"
            INSERT INTO parts_inventory
                (id, part_number, name, description, category, location, unit_cost,
                 quantity_on_hand, minimum_quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(part_number)
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(location)
        .bind(unit_cost)
        .bind(quantity_on_hand)
        .bind(minimum_quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(part)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        category: Option<String>,
        location: Option<String>,
        unit_cost: Option<Decimal>,
        quantity_on_hand: Option<i32>,
        minimum_quantity: Option<i32>,
    ) -> Result<PartsInventory, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Part not found".to_string()))?;

        let part = sqlx::query_as::<_, PartsInventory>(
            r#"
            UPDATE parts_inventory
            SET name = $2, description = $3, category = $4, location = $5, unit_cost = $6,
                quantity_on_hand = $7, minimum_quantity = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name.unwrap_or(current.name))
        .bind(description.or(current.description))
        .bind(category.or(current.category))
        .bind(location.or(current.location))
        .bind(unit_cost.or(current.unit_cost))
        .bind(quantity_on_hand.unwrap_or(current.quantity_on_hand))
        .bind(minimum_quantity.unwrap_or(current.minimum_quantity))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(part)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM parts_inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Part not found".to_string()));
        }

        Ok(())
    }

    /// Repuestos bajo el mínimo, acotados para la bandeja de alertas
    pub async fn find_low_stock(&self, limit: i64) -> Result<Vec<PartsInventory>, AppError> {
        let parts = sqlx::query_as::<_, PartsInventory>(
            r#"
            SELECT * FROM parts_inventory
            WHERE quantity_on_hand <= minimum_quantity
            ORDER BY (quantity_on_hand - minimum_quantity)
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(parts)
    }

    pub async fn count_low_stock(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM parts_inventory WHERE quantity_on_hand <= minimum_quantity",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
