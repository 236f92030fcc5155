//! Modelo de Vehicle
//!
//! Mapea la tabla vehicles. Los campos mileage y engine_hours solo
//! aumentan bajo operación normal: la reconciliación de telemetría los
//! actualiza con regla de ratchet (acepta solo incrementos).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub vin: String,
    /// Id del vehículo en el proveedor de telemática (null si no está vinculado)
    pub telematics_id: Option<String>,
    pub unit_number: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: Option<String>,
    pub status: String,
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
    pub last_service_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Regla de ratchet para el odómetro: acepta solo incrementos.
///
/// Una lectura menor a la almacenada indica datos viejos o parciales del
/// proveedor, no un retroceso real: se ignora en silencio.
pub fn ratchet_mileage(stored: Option<i32>, incoming: Option<i32>) -> Option<i32> {
    match (stored, incoming) {
        (Some(current), Some(new)) if new > current => Some(new),
        (None, Some(new)) => Some(new),
        (current, _) => current,
    }
}

/// Regla de ratchet para horas de motor
pub fn ratchet_engine_hours(stored: Option<Decimal>, incoming: Option<Decimal>) -> Option<Decimal> {
    match (stored, incoming) {
        (Some(current), Some(new)) if new > current => Some(new),
        (None, Some(new)) => Some(new),
        (current, _) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratchet_ignores_regressions() {
        // snapshot viejo del proveedor: 49000 contra 50000 almacenado
        assert_eq!(ratchet_mileage(Some(50_000), Some(49_000)), Some(50_000));
        assert_eq!(ratchet_mileage(Some(50_000), Some(51_000)), Some(51_000));
    }

    #[test]
    fn test_ratchet_accepts_first_reading() {
        assert_eq!(ratchet_mileage(None, Some(1200)), Some(1200));
        assert_eq!(ratchet_mileage(None, None), None);
    }

    #[test]
    fn test_ratchet_keeps_stored_when_no_reading() {
        assert_eq!(ratchet_mileage(Some(80_000), None), Some(80_000));
        assert_eq!(
            ratchet_engine_hours(Some(Decimal::from(300)), None),
            Some(Decimal::from(300))
        );
    }

    #[test]
    fn test_ratchet_equal_value_is_noop() {
        assert_eq!(ratchet_mileage(Some(50_000), Some(50_000)), Some(50_000));
    }
}
