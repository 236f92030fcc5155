//! Controlador de telemática: sincronización y passthrough de estadísticas

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dto::common::ApiResponse;
use crate::dto::telematics_dto::StatSnapshot;
use crate::models::sync_run::SyncRun;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::sync_service::SyncService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Disparar una corrida de sincronización
///
/// Responde Conflict si ya hay una corrida en vuelo. La corrida se ejecuta
/// dentro del request: el resultado incluye los contadores finales.
pub async fn start_sync(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SyncRun>>> {
    let service = SyncService::new(state.pool.clone(), state.telematics.clone());
    let run = service.run().await?;

    Ok(Json(ApiResponse::success(run)))
}

/// Estado de la última corrida registrada (None si nunca corrió)
pub async fn sync_status(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Option<SyncRun>>>> {
    let service = SyncService::new(state.pool.clone(), state.telematics.clone());
    let latest = service.latest_run().await?;

    Ok(Json(ApiResponse::success(latest)))
}

/// Forzar a failed las corridas colgadas en running
pub async fn reset_sync(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<u64>>> {
    let service = SyncService::new(state.pool.clone(), state.telematics.clone());
    let failed = service.reset_stuck().await?;

    Ok(Json(ApiResponse::success_with_message(
        failed,
        format!("{} stuck runs marked as failed", failed),
    )))
}

#[derive(Debug, Deserialize, Default)]
pub struct StatsQuery {
    /// Tipos de estadística separados por coma
    pub types: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Ids de vehículo en el proveedor, separados por coma
    pub vehicle_ids: String,
    pub types: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub vehicle_ids: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub types: Option<String>,
}

fn split_csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Snapshot de estadísticas del proveedor para un vehículo local
pub async fn vehicle_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<StatSnapshot>>> {
    let vehicles = VehicleRepository::new(state.pool.clone());
    let vehicle = vehicles
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

    let telematics_id = vehicle.telematics_id.ok_or_else(|| {
        AppError::Validation("Vehicle is not linked to the telematics provider".to_string())
    })?;

    let types = split_csv(&query.types);
    let snapshot = state.telematics.get_stats(&telematics_id, &types).await?;

    Ok(Json(ApiResponse::success(snapshot)))
}

/// Passthrough del feed de estadísticas del proveedor
pub async fn stats_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let vehicle_ids: Vec<String> = query
        .vehicle_ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if vehicle_ids.is_empty() {
        return Err(AppError::Validation(
            "vehicle_ids must not be empty".to_string(),
        ));
    }

    let types = split_csv(&query.types);
    let feed = state.telematics.get_stats_feed(&vehicle_ids, &types).await?;

    Ok(Json(ApiResponse::success(feed)))
}

/// Passthrough del histórico de estadísticas del proveedor
pub async fn stats_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    if query.end_time <= query.start_time {
        return Err(AppError::Validation(
            "end_time must be after start_time".to_string(),
        ));
    }

    let vehicle_ids: Vec<String> = query
        .vehicle_ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if vehicle_ids.is_empty() {
        return Err(AppError::Validation(
            "vehicle_ids must not be empty".to_string(),
        ));
    }

    let types = split_csv(&query.types);
    let history = state
        .telematics
        .get_stats_history(&vehicle_ids, query.start_time, query.end_time, &types)
        .await?;

    Ok(Json(ApiResponse::success(history)))
}
