//! Controlador de inventario de repuestos

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::part_dto::{CreatePartRequest, UpdatePartRequest};
use crate::models::part::PartsInventory;
use crate::repositories::part_repository::PartRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

pub async fn list_parts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PartsInventory>>>> {
    let repo = PartRepository::new(state.pool.clone());
    let parts = repo.find_all().await?;

    Ok(Json(ApiResponse::success(parts)))
}

pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PartsInventory>>> {
    let repo = PartRepository::new(state.pool.clone());
    let part = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Part", &id.to_string()))?;

    Ok(Json(ApiResponse::success(part)))
}

pub async fn create_part(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartRequest>,
) -> AppResult<Json<ApiResponse<PartsInventory>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let repo = PartRepository::new(state.pool.clone());
    if repo.part_number_exists(&payload.part_number).await? {
        return Err(AppError::Conflict(format!(
            "A part with number '{}' already exists",
            payload.part_number
        )));
    }

    let part = repo
        .create(
            payload.part_number,
            payload.name,
            payload.description,
            payload.category,
            payload.location,
            payload.unit_cost,
            payload.quantity_on_hand,
            payload.minimum_quantity,
        )
        .await?;

    log::info!("🔩 Repuesto creado: {} ({})", part.name, part.part_number);
    Ok(Json(ApiResponse::success(part)))
}

pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartRequest>,
) -> AppResult<Json<ApiResponse<PartsInventory>>> {
    payload
        .validate()
        .map_err(|e| validation_error(&e.to_string()))?;

    let repo = PartRepository::new(state.pool.clone());
    let part = repo
        .update(
            id,
            payload.name,
            payload.description,
            payload.category,
            payload.location,
            payload.unit_cost,
            payload.quantity_on_hand,
            payload.minimum_quantity,
        )
        .await?;

    Ok(Json(ApiResponse::success(part)))
}

pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = PartRepository::new(state.pool.clone());
    repo.delete(id).await?;

    Ok(Json(ApiResponse::success_with_message(
        (),
        "Part deleted".to_string(),
    )))
}

/// Repuestos con stock en o bajo el mínimo
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PartsInventory>>>> {
    let repo = PartRepository::new(state.pool.clone());
    let parts = repo.find_low_stock(100).await?;

    Ok(Json(ApiResponse::success(parts)))
}
