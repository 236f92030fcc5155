//! Cliente HTTP del proveedor de telemática
//!
//! Transporte request/response con bearer token. El proveedor limita la
//! cantidad de tipos de estadística por request, así que las consultas
//! grandes se parten en batches secuenciales de hasta 3 tipos y los
//! resultados parciales se mergean por vehículo antes de usarse.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::environment::EnvironmentConfig;
use crate::dto::telematics_dto::{
    numeric_value, DiagnosticSource, ProviderDiagnostic, ProviderVehicle, StatSnapshot,
};
use crate::utils::errors::{AppError, AppResult};

/// Límite de tipos de estadística por request impuesto por el proveedor
pub const MAX_STAT_TYPES_PER_REQUEST: usize = 3;

/// Tipos pedidos por defecto cuando el caller no especifica
pub const DEFAULT_STAT_TYPES: [&str; 3] = ["engineStates", "obdOdometerMeters", "fuelPercents"];

/// Partir la lista de tipos en batches de a lo sumo `max` elementos
pub fn chunk_stat_types(types: &[String], max: usize) -> Vec<Vec<String>> {
    types.chunks(max.max(1)).map(|c| c.to_vec()).collect()
}

pub struct TelematicsClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl TelematicsClient {
    pub fn new(config: &EnvironmentConfig) -> AppResult<Self> {
        if config.telematics_api_token.trim().is_empty() {
            // Error de configuración: se detecta al construir, no por request
            return Err(AppError::Internal(
                "Telematics API token not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.telematics_base_url.trim_end_matches('/').to_string(),
            api_token: config.telematics_api_token.clone(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::ExternalUnavailable(format!("Provider request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalUnavailable(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::ExternalUnavailable(format!("Invalid provider response: {}", e)))
    }

    /// Listar los vehículos de la flota en el proveedor
    ///
    /// Tolerante a la forma plana y a la anidada de la lista (varía entre
    /// cuentas); las entradas sin id se saltan con warning.
    pub async fn list_vehicles(&self) -> AppResult<Vec<ProviderVehicle>> {
        let body = self.get_json("/fleet/vehicles", &[]).await?;

        let entries = body
            .get("data")
            .or_else(|| body.get("vehicles"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut vehicles = Vec::with_capacity(entries.len());
        for entry in &entries {
            match ProviderVehicle::from_value(entry) {
                Some(vehicle) => vehicles.push(vehicle),
                None => log::warn!("⚠️ Vehículo del proveedor sin id, se salta: {}", entry),
            }
        }

        log::info!("📡 Proveedor devolvió {} vehículos", vehicles.len());
        Ok(vehicles)
    }

    /// Snapshot actual de estadísticas para un vehículo
    ///
    /// Parte `types` en batches de ≤ 3 y mergea los parciales. Un batch
    /// fallido se loguea y se continúa; solo es error si ningún batch
    /// devolvió datos.
    pub async fn get_stats(&self, vehicle_id: &str, types: &[String]) -> AppResult<StatSnapshot> {
        let types: Vec<String> = if types.is_empty() {
            DEFAULT_STAT_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            types.to_vec()
        };

        let batches = chunk_stat_types(&types, MAX_STAT_TYPES_PER_REQUEST);
        log::info!(
            "📡 Pidiendo stats de {} en {} batches ({} tipos)",
            vehicle_id,
            batches.len(),
            types.len()
        );

        let mut snapshot = StatSnapshot::default();
        for (index, batch) in batches.iter().enumerate() {
            let params = [
                ("vehicles", vehicle_id.to_string()),
                ("types", batch.join(",")),
            ];

            match self.get_json("/fleet/vehicles/stats", &params).await {
                Ok(body) => {
                    if let Some(Value::Object(fields)) =
                        body.get("data").and_then(Value::as_array).and_then(|d| d.first()).cloned()
                    {
                        snapshot.merge(fields);
                    } else {
                        log::warn!("⚠️ Batch {}/{} sin datos", index + 1, batches.len());
                    }
                }
                Err(e) => {
                    // No descartar lo ya mergeado por un batch fallido
                    log::error!("❌ Batch {}/{} falló: {}", index + 1, batches.len(), e);
                }
            }
        }

        if snapshot.is_empty() {
            return Err(AppError::ExternalUnavailable(
                "Failed to retrieve any vehicle stats data".to_string(),
            ));
        }

        Ok(snapshot)
    }

    /// Feed de estadísticas para varios vehículos (sincronización continua)
    pub async fn get_stats_feed(
        &self,
        vehicle_ids: &[String],
        types: &[String],
    ) -> AppResult<Vec<Value>> {
        let types: Vec<String> = if types.is_empty() {
            DEFAULT_STAT_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            types.to_vec()
        };

        let mut merged: Vec<Value> = Vec::new();
        for batch in chunk_stat_types(&types, MAX_STAT_TYPES_PER_REQUEST) {
            let params = [
                ("vehicles", vehicle_ids.join(",")),
                ("types", batch.join(",")),
            ];
            let body = self.get_json("/fleet/vehicles/stats/feed", &params).await?;
            let batch_data = body
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            merge_feed_batch(&mut merged, batch_data);
        }

        Ok(merged)
    }

    /// Histórico de estadísticas entre dos instantes
    pub async fn get_stats_history(
        &self,
        vehicle_ids: &[String],
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        types: &[String],
    ) -> AppResult<Vec<Value>> {
        let types: Vec<String> = if types.is_empty() {
            DEFAULT_STAT_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            types.to_vec()
        };

        let mut merged: Vec<Value> = Vec::new();
        for batch in chunk_stat_types(&types, MAX_STAT_TYPES_PER_REQUEST) {
            let params = [
                ("vehicles", vehicle_ids.join(",")),
                ("types", batch.join(",")),
                ("startTime", start_time.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
                ("endTime", end_time.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ];
            let body = self
                .get_json("/fleet/vehicles/stats/history", &params)
                .await?;
            let batch_data = body
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            merge_feed_batch(&mut merged, batch_data);
        }

        Ok(merged)
    }

    /// Eventos de diagnóstico de un vehículo
    ///
    /// Combina dos fuentes: fault codes del endpoint de stats y defectos
    /// de DVIR del endpoint de mantenimiento. El fallo de una fuente no
    /// impide usar la otra.
    pub async fn get_diagnostics(&self, vehicle_id: &str) -> AppResult<Vec<ProviderDiagnostic>> {
        let mut all_codes = Vec::new();

        // Fuente 1: fault codes
        let params = [
            ("vehicles", vehicle_id.to_string()),
            ("types", "faultCodes".to_string()),
        ];
        match self.get_json("/fleet/vehicles/stats", &params).await {
            Ok(body) => {
                if let Some(vehicle_data) =
                    body.get("data").and_then(Value::as_array).and_then(|d| d.first())
                {
                    for code in vehicle_data
                        .get("faultCodes")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default()
                    {
                        if let Some(diagnostic) = parse_fault_code(&code) {
                            all_codes.push(diagnostic);
                        } else {
                            log::warn!("⚠️ Formato de fault code inesperado: {}", code);
                        }
                    }
                }
            }
            Err(e) => log::warn!("⚠️ No se pudieron obtener fault codes: {}", e),
        }

        // Fuente 2: defectos de DVIR
        let params = [("vehicleId", vehicle_id.to_string())];
        match self.get_json("/fleet/maintenance/dvirs", &params).await {
            Ok(body) => {
                for dvir in body
                    .get("dvirs")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
                {
                    let reported_date = dvir
                        .get("inspectionTimeMs")
                        .and_then(Value::as_i64)
                        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                        .unwrap_or_else(Utc::now);

                    for defect in dvir
                        .get("defects")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default()
                    {
                        all_codes.push(parse_dvir_defect(&defect, reported_date));
                    }
                }
            }
            Err(e) => log::warn!("⚠️ No se pudieron obtener DVIRs: {}", e),
        }

        log::info!(
            "📡 {} eventos de diagnóstico para vehículo {}",
            all_codes.len(),
            vehicle_id
        );
        Ok(all_codes)
    }
}

/// Mergear un batch del feed dentro del acumulado, por posición de vehículo
fn merge_feed_batch(merged: &mut Vec<Value>, batch: Vec<Value>) {
    if merged.is_empty() {
        *merged = batch;
        return;
    }

    for (index, vehicle_stats) in batch.into_iter().enumerate() {
        if index >= merged.len() {
            break;
        }
        if let (Some(target), Value::Object(fields)) = (merged.get_mut(index), vehicle_stats) {
            if let Some(target_obj) = target.as_object_mut() {
                for (key, value) in fields {
                    target_obj.insert(key, value);
                }
            }
        }
    }
}

/// Fault code del proveedor: puede llegar como objeto o como string pelado
fn parse_fault_code(code: &Value) -> Option<ProviderDiagnostic> {
    match code {
        Value::Object(obj) => Some(ProviderDiagnostic {
            source: DiagnosticSource::FaultCode,
            code: obj
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            description: obj
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            severity: obj
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or("Medium")
                .to_string(),
            reported_date: Utc::now(),
        }),
        Value::String(code) => Some(ProviderDiagnostic {
            source: DiagnosticSource::FaultCode,
            code: code.clone(),
            description: None,
            severity: "Medium".to_string(),
            reported_date: Utc::now(),
        }),
        _ => None,
    }
}

fn parse_dvir_defect(defect: &Value, reported_date: DateTime<Utc>) -> ProviderDiagnostic {
    ProviderDiagnostic {
        source: DiagnosticSource::DvirDefect,
        code: defect
            .get("defectCode")
            .and_then(Value::as_str)
            .or_else(|| defect.get("defectType").and_then(Value::as_str))
            .unwrap_or("Unknown")
            .to_string(),
        description: defect
            .get("comment")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        severity: "Medium".to_string(),
        reported_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn types(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("type{}", i)).collect()
    }

    #[test]
    fn test_chunk_eight_types_into_three_calls() {
        // 8 tipos con límite 3 -> batches de 3, 3 y 2
        let batches = chunk_stat_types(&types(8), MAX_STAT_TYPES_PER_REQUEST);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 2);

        let total: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_chunk_within_limit_is_single_call() {
        let batches = chunk_stat_types(&types(3), MAX_STAT_TYPES_PER_REQUEST);
        assert_eq!(batches.len(), 1);
    }

    #[test]
    fn test_merge_feed_batch_by_vehicle_position() {
        let mut merged = vec![
            json!({ "id": "v1", "engineStates": "On" }),
            json!({ "id": "v2", "engineStates": "Off" }),
        ];
        let second_batch = vec![
            json!({ "fuelPercents": 80 }),
            json!({ "fuelPercents": 45 }),
        ];
        merge_feed_batch(&mut merged, second_batch);

        assert_eq!(merged[0]["engineStates"], "On");
        assert_eq!(merged[0]["fuelPercents"], 80);
        assert_eq!(merged[1]["fuelPercents"], 45);
    }

    #[test]
    fn test_parse_fault_code_object_and_string() {
        let from_obj = parse_fault_code(&json!({
            "code": "P0420",
            "description": "Catalyst efficiency below threshold",
            "severity": "High"
        }))
        .unwrap();
        assert_eq!(from_obj.code, "P0420");
        assert_eq!(from_obj.severity, "High");
        assert_eq!(from_obj.source, DiagnosticSource::FaultCode);

        let from_str = parse_fault_code(&json!("P0171")).unwrap();
        assert_eq!(from_str.code, "P0171");
        assert_eq!(from_str.severity, "Medium");

        assert!(parse_fault_code(&json!(42)).is_none());
    }

    #[test]
    fn test_parse_dvir_defect_prefers_defect_code() {
        let defect = json!({
            "defectCode": "BRAKES",
            "defectType": "brakeSystem",
            "comment": "  grinding noise on front axle  "
        });
        let parsed = parse_dvir_defect(&defect, Utc::now());
        assert_eq!(parsed.code, "BRAKES");
        assert_eq!(parsed.description.as_deref(), Some("grinding noise on front axle"));
        assert!(parsed.is_maintenance_relevant());
    }
}
