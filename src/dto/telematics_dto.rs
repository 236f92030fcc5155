//! Tipos con la forma del proveedor de telemática
//!
//! El proveedor devuelve JSON semi-estructurado y la forma de la lista de
//! vehículos varía entre cuentas (plana o anidada bajo "data"), así que el
//! parseo es tolerante: entradas sin id se descartan con warning en lugar
//! de abortar.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Vehículo tal como lo reporta el proveedor
#[derive(Debug, Clone, Serialize)]
pub struct ProviderVehicle {
    pub id: String,
    pub name: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub odometer_meters: Option<f64>,
}

impl ProviderVehicle {
    /// Parsear una entrada de la lista de vehículos
    ///
    /// Acepta tanto la forma plana `{"id": ...}` como la anidada
    /// `{"data": {"id": ...}}`. Devuelve None si no hay id.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = if value.get("id").is_some() {
            value
        } else if value.get("data").and_then(|d| d.get("id")).is_some() {
            value.get("data").unwrap()
        } else {
            return None;
        };

        let id = match obj.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return None,
        };

        Some(Self {
            id,
            name: string_field(obj, "name"),
            vin: string_field(obj, "vin"),
            license_plate: string_field(obj, "licensePlate"),
            make: string_field(obj, "make"),
            model: string_field(obj, "model"),
            year: obj.get("year").and_then(Value::as_i64).map(|y| y as i32),
            odometer_meters: obj.get("odometerMeters").and_then(numeric_value),
        })
    }
}

/// Snapshot de estadísticas de un vehículo, mergeado a través de batches
///
/// El proveedor limita los tipos de estadística por request; el cliente
/// parte la consulta en batches y acumula los resultados parciales aquí.
/// Un batch fallido no descarta lo ya mergeado.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatSnapshot {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StatSnapshot {
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.fields.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Odómetro en metros, aceptando número plano u objeto `{"value": n}`
    pub fn odometer_meters(&self) -> Option<f64> {
        self.fields
            .get("obdOdometerMeters")
            .or_else(|| self.fields.get("gpsOdometerMeters"))
            .and_then(numeric_value)
    }

    /// Horas de motor reportadas por el proveedor
    pub fn engine_hours(&self) -> Option<f64> {
        self.fields
            .get("engineHours")
            .and_then(numeric_value)
            .or_else(|| {
                self.fields
                    .get("obdEngineSeconds")
                    .and_then(numeric_value)
                    .map(|s| s / 3600.0)
            })
    }
}

/// Extraer un número de un valor plano o de un objeto `{"value": n}`
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => obj.get("value").and_then(Value::as_f64),
        _ => None,
    }
}

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Origen de un evento de diagnóstico del proveedor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSource {
    FaultCode,
    DvirDefect,
}

/// Evento de diagnóstico normalizado (fault code u defecto de DVIR)
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDiagnostic {
    pub source: DiagnosticSource,
    pub code: String,
    pub description: Option<String>,
    pub severity: String,
    pub reported_date: DateTime<Utc>,
}

impl ProviderDiagnostic {
    /// Los defectos de DVIR son relevantes para mantenimiento: pueden
    /// plegarse en asignaciones sintéticas si no existe un match local
    pub fn is_maintenance_relevant(&self) -> bool {
        self.source == DiagnosticSource::DvirDefect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_vehicle_from_flat_shape() {
        let value = json!({
            "id": 123456,
            "name": "Peterbilt 579",
            "licensePlate": "ABC-1234",
            "odometerMeters": 160934.0
        });
        let vehicle = ProviderVehicle::from_value(&value).unwrap();
        assert_eq!(vehicle.id, "123456");
        assert_eq!(vehicle.name.as_deref(), Some("Peterbilt 579"));
        assert_eq!(vehicle.license_plate.as_deref(), Some("ABC-1234"));
        assert_eq!(vehicle.odometer_meters, Some(160934.0));
    }

    #[test]
    fn test_provider_vehicle_from_nested_shape() {
        let value = json!({
            "data": { "id": "v-789", "vin": "1XPBDP9X1MD000001" }
        });
        let vehicle = ProviderVehicle::from_value(&value).unwrap();
        assert_eq!(vehicle.id, "v-789");
        assert_eq!(vehicle.vin.as_deref(), Some("1XPBDP9X1MD000001"));
    }

    #[test]
    fn test_provider_vehicle_without_id_is_skipped() {
        let value = json!({ "name": "mystery truck" });
        assert!(ProviderVehicle::from_value(&value).is_none());
    }

    #[test]
    fn test_snapshot_merge_keeps_prior_batches() {
        let mut snapshot = StatSnapshot::default();
        let first = json!({ "engineStates": "Off", "obdOdometerMeters": { "value": 321868.0 } });
        let second = json!({ "fuelPercents": 74 });
        snapshot.merge(first.as_object().unwrap().clone());
        snapshot.merge(second.as_object().unwrap().clone());

        assert_eq!(snapshot.fields.len(), 3);
        assert_eq!(snapshot.odometer_meters(), Some(321868.0));
        assert!(snapshot.get("fuelPercents").is_some());
    }

    #[test]
    fn test_numeric_value_accepts_plain_and_wrapped() {
        assert_eq!(numeric_value(&json!(42.5)), Some(42.5));
        assert_eq!(numeric_value(&json!({ "value": 7 })), Some(7.0));
        assert_eq!(numeric_value(&json!("nope")), None);
    }

    #[test]
    fn test_engine_hours_falls_back_to_engine_seconds() {
        let mut snapshot = StatSnapshot::default();
        snapshot.merge(
            json!({ "obdEngineSeconds": 7200 })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(snapshot.engine_hours(), Some(2.0));
    }
}
