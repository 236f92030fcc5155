//! Reconciliador de telemetría
//!
//! Orquesta una corrida de sincronización contra el proveedor: lista la
//! flota remota, crea placeholders para vehículos desconocidos, aplica la
//! regla de ratchet sobre odómetro y horas de motor, deduplica códigos de
//! diagnóstico y pliega defectos de DVIR en asignaciones de inspección.
//! El fallo de un vehículo se aísla: se cuenta y se sigue con el resto.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::telematics_dto::{ProviderDiagnostic, ProviderVehicle};
use crate::models::sync_run::SyncRun;
use crate::models::vehicle::{ratchet_engine_hours, ratchet_mileage, Vehicle};
use crate::repositories::activity_log_repository::ActivityLogRepository;
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::diagnostic_repository::DiagnosticRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::repositories::sync_run_repository::SyncRunRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::due_state::{compute_due_state, Checkpoint, CurrentReading};
use crate::services::telematics_client::TelematicsClient;
use crate::utils::errors::{AppError, AppResult};

/// Factor de conversión metros -> millas del odómetro del proveedor
const METERS_PER_MILE: f64 = 1609.34;

/// Intervalo de calendario de los templates sintéticos creados a partir
/// de defectos de DVIR sin template local
const SYNTHETIC_INSPECTION_INTERVAL_DAYS: i32 = 90;

/// Tipos de estadística pedidos en cada corrida
const SYNC_STAT_TYPES: [&str; 3] = ["obdOdometerMeters", "gpsOdometerMeters", "engineHours"];

/// Normalizar un nombre de template para comparación: trim, minúsculas y
/// espacios internos colapsados
pub fn normalize_template_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Odómetro del proveedor (metros) a millas enteras
pub fn meters_to_miles(meters: f64) -> i32 {
    (meters / METERS_PER_MILE).round() as i32
}

/// Un reporte de DVIR avanza el checkpoint de la asignación solo si es
/// estrictamente más nuevo que el último registrado. Sin checkpoint previo
/// cualquier reporte cuenta.
pub fn report_advances_checkpoint(
    reported_date: DateTime<Utc>,
    last_performed_date: Option<DateTime<Utc>>,
) -> bool {
    match last_performed_date {
        Some(last) => reported_date > last,
        None => true,
    }
}

#[derive(Debug, Default)]
struct SyncCounters {
    vehicles_processed: i32,
    vehicles_failed: i32,
    created_count: i32,
    updated_count: i32,
}

pub struct SyncService {
    pool: PgPool,
    client: Arc<TelematicsClient>,
}

impl SyncService {
    pub fn new(pool: PgPool, client: Arc<TelematicsClient>) -> Self {
        Self { pool, client }
    }

    /// Ejecutar una corrida de sincronización completa
    ///
    /// El guard de corrida única es advisory: si la última corrida sigue
    /// en running se responde Conflict en lugar de encolar.
    pub async fn run(&self) -> AppResult<SyncRun> {
        let runs = SyncRunRepository::new(self.pool.clone());

        if let Some(latest) = runs.find_latest().await? {
            if latest.is_running() {
                return Err(AppError::Conflict(
                    "A telematics sync is already running".to_string(),
                ));
            }
        }

        let run = runs.create_running().await?;
        log::info!("🔄 Corrida de sincronización {} iniciada", run.id);

        match self.reconcile().await {
            Ok(counters) => {
                let run = runs
                    .mark_completed(
                        run.id,
                        counters.vehicles_processed,
                        counters.vehicles_failed,
                        counters.created_count,
                        counters.updated_count,
                    )
                    .await?;
                log::info!(
                    "✅ Sincronización {} completada: {} procesados, {} fallidos, {} creados, {} actualizados",
                    run.id,
                    counters.vehicles_processed,
                    counters.vehicles_failed,
                    counters.created_count,
                    counters.updated_count
                );
                Ok(run)
            }
            Err(e) => {
                log::error!("❌ Sincronización {} falló: {}", run.id, e);
                runs.mark_failed(run.id, &e.to_string()).await?;
                Err(e)
            }
        }
    }

    /// Estado de la última corrida registrada
    pub async fn latest_run(&self) -> AppResult<Option<SyncRun>> {
        SyncRunRepository::new(self.pool.clone()).find_latest().await
    }

    /// Forzar a failed toda corrida colgada en running
    pub async fn reset_stuck(&self) -> AppResult<u64> {
        let failed = SyncRunRepository::new(self.pool.clone())
            .fail_running_runs("Manually reset")
            .await?;
        if failed > 0 {
            log::warn!("⚠️ {} corridas colgadas marcadas como failed", failed);
        }
        Ok(failed)
    }

    async fn reconcile(&self) -> AppResult<SyncCounters> {
        let provider_vehicles = self.client.list_vehicles().await?;
        let mut counters = SyncCounters::default();

        for provider_vehicle in &provider_vehicles {
            counters.vehicles_processed += 1;
            match self.sync_vehicle(provider_vehicle).await {
                Ok(outcome) => {
                    if outcome.created {
                        counters.created_count += 1;
                    }
                    if outcome.updated {
                        counters.updated_count += 1;
                    }
                }
                Err(e) => {
                    // Aislamiento por vehículo: contar y seguir
                    counters.vehicles_failed += 1;
                    log::error!(
                        "❌ Falló la sincronización del vehículo {}: {}",
                        provider_vehicle.id,
                        e
                    );
                }
            }
        }

        Ok(counters)
    }

    async fn sync_vehicle(&self, provider_vehicle: &ProviderVehicle) -> AppResult<VehicleOutcome> {
        let vehicles = VehicleRepository::new(self.pool.clone());

        let (vehicle, created) = match vehicles
            .find_by_telematics_id(&provider_vehicle.id)
            .await?
        {
            Some(vehicle) => (vehicle, false),
            None => {
                let vehicle = self.create_placeholder(&vehicles, provider_vehicle).await?;
                (vehicle, true)
            }
        };

        let updated = self.apply_telemetry(&vehicles, &vehicle, provider_vehicle).await?;
        self.sync_diagnostics(&vehicle).await?;
        self.recompute_assignments(vehicle.id).await?;

        Ok(VehicleOutcome { created, updated })
    }

    /// Crear un placeholder local para un vehículo que solo existe en el
    /// proveedor. Sin VIN reportado se usa uno sintético derivado del id.
    async fn create_placeholder(
        &self,
        vehicles: &VehicleRepository,
        provider_vehicle: &ProviderVehicle,
    ) -> AppResult<Vehicle> {
        let vin = provider_vehicle
            .vin
            .clone()
            .unwrap_or_else(|| format!("TELEMATICS-{}", provider_vehicle.id));

        let mileage = provider_vehicle.odometer_meters.map(meters_to_miles);

        let vehicle = vehicles
            .create(
                vin,
                Some(provider_vehicle.id.clone()),
                provider_vehicle.name.clone(),
                provider_vehicle.make.clone().unwrap_or_else(|| "Unknown".to_string()),
                provider_vehicle.model.clone().unwrap_or_else(|| "Unknown".to_string()),
                provider_vehicle.year.unwrap_or(1900),
                provider_vehicle.license_plate.clone(),
                "Active".to_string(),
                mileage,
                None,
            )
            .await?;

        log::info!(
            "🚚 Vehículo placeholder creado para id de proveedor {} ({})",
            provider_vehicle.id,
            vehicle.vin
        );

        let logs = ActivityLogRepository::new(self.pool.clone());
        if let Err(e) = logs
            .record(
                "vehicle_created_from_sync",
                "vehicle",
                Some(vehicle.id),
                Some(format!("provider id {}", provider_vehicle.id)),
            )
            .await
        {
            log::warn!("⚠️ No se pudo registrar actividad: {}", e);
        }

        Ok(vehicle)
    }

    /// Pedir el snapshot de estadísticas y aplicar la regla de ratchet
    async fn apply_telemetry(
        &self,
        vehicles: &VehicleRepository,
        vehicle: &Vehicle,
        provider_vehicle: &ProviderVehicle,
    ) -> AppResult<bool> {
        let types: Vec<String> = SYNC_STAT_TYPES.iter().map(|s| s.to_string()).collect();

        let snapshot = match self.client.get_stats(&provider_vehicle.id, &types).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                // Sin snapshot la dimensión queda indeterminada, no en cero
                log::warn!(
                    "⚠️ Sin stats para el vehículo {}: {}",
                    provider_vehicle.id,
                    e
                );
                None
            }
        };

        let incoming_mileage = snapshot
            .as_ref()
            .and_then(|s| s.odometer_meters())
            .or(provider_vehicle.odometer_meters)
            .map(meters_to_miles);

        let incoming_hours = snapshot
            .as_ref()
            .and_then(|s| s.engine_hours())
            .and_then(Decimal::from_f64_retain);

        let mileage = ratchet_mileage(vehicle.mileage, incoming_mileage);
        let engine_hours = ratchet_engine_hours(vehicle.engine_hours, incoming_hours);

        let changed = mileage != vehicle.mileage
            || engine_hours != vehicle.engine_hours
            || (provider_vehicle.name.is_some() && provider_vehicle.name != vehicle.unit_number)
            || (provider_vehicle.license_plate.is_some()
                && provider_vehicle.license_plate != vehicle.license_plate);

        if changed {
            vehicles
                .update_telemetry(
                    vehicle.id,
                    mileage,
                    engine_hours,
                    provider_vehicle.name.clone(),
                    provider_vehicle.license_plate.clone(),
                )
                .await?;

            let logs = ActivityLogRepository::new(self.pool.clone());
            if let Err(e) = logs
                .record(
                    "vehicle_telemetry_updated",
                    "vehicle",
                    Some(vehicle.id),
                    Some(format!(
                        "mileage {:?} -> {:?}, engine_hours {:?} -> {:?}",
                        vehicle.mileage, mileage, vehicle.engine_hours, engine_hours
                    )),
                )
                .await
            {
                log::warn!("⚠️ No se pudo registrar actividad: {}", e);
            }
        }

        Ok(changed)
    }

    /// Traer eventos de diagnóstico, deduplicar por (vehículo, código) y
    /// plegar los defectos de DVIR en asignaciones de inspección
    async fn sync_diagnostics(&self, vehicle: &Vehicle) -> AppResult<()> {
        let telematics_id = match &vehicle.telematics_id {
            Some(id) => id.clone(),
            None => return Ok(()),
        };

        let events = match self.client.get_diagnostics(&telematics_id).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("⚠️ Sin diagnósticos para el vehículo {}: {}", telematics_id, e);
                return Ok(());
            }
        };

        let diagnostics = DiagnosticRepository::new(self.pool.clone());
        for event in &events {
            let existing = diagnostics
                .find_unresolved_by_vehicle_and_code(vehicle.id, &event.code)
                .await?;

            if existing.is_none() {
                let diagnostic = diagnostics
                    .create(
                        vehicle.id,
                        event.code.clone(),
                        event.description.clone(),
                        Some(event.severity.clone()),
                        event.reported_date,
                    )
                    .await?;
                log::info!(
                    "🔔 Código de diagnóstico {} registrado para {}",
                    event.code,
                    vehicle.vin
                );

                let logs = ActivityLogRepository::new(self.pool.clone());
                if let Err(e) = logs
                    .record(
                        "diagnostic_code_created",
                        "diagnostic_code",
                        Some(diagnostic.id),
                        Some(format!("{} on {}", event.code, vehicle.vin)),
                    )
                    .await
                {
                    log::warn!("⚠️ No se pudo registrar actividad: {}", e);
                }
            }

            if event.is_maintenance_relevant() {
                self.fold_dvir_defect(vehicle, event).await?;
            }
        }

        Ok(())
    }

    /// Plegar un defecto de DVIR en una asignación de inspección
    ///
    /// El match contra templates existentes es por nombre normalizado. Sin
    /// match se crea un template sintético de calendario (90 días) y su
    /// asignación, con el checkpoint sembrado en la fecha del reporte. Si
    /// la asignación ya existe, un reporte con fecha más nueva avanza el
    /// checkpoint y recalcula el próximo vencimiento.
    async fn fold_dvir_defect(
        &self,
        vehicle: &Vehicle,
        event: &ProviderDiagnostic,
    ) -> AppResult<()> {
        let template_name = event
            .description
            .clone()
            .unwrap_or_else(|| format!("Inspection: {}", event.code));

        let schedules = ScheduleRepository::new(self.pool.clone());
        let normalized = normalize_template_name(&template_name);

        let schedule = match schedules.find_by_normalized_name(&normalized).await? {
            Some(schedule) => schedule,
            None => {
                let schedule = schedules
                    .create(
                        template_name.clone(),
                        Some(format!("Created from DVIR defect {}", event.code)),
                        false,
                        true,
                        false,
                        None,
                        Some(SYNTHETIC_INSPECTION_INTERVAL_DAYS),
                        None,
                    )
                    .await?;
                log::info!("🛠️ Template sintético creado: {}", schedule.name);
                schedule
            }
        };

        let assignments = AssignmentRepository::new(self.pool.clone());
        let now = Utc::now();
        let current = CurrentReading {
            mileage: vehicle.mileage,
            engine_hours: vehicle.engine_hours,
        };

        if let Some(assignment) = assignments.find_pair(vehicle.id, schedule.id).await? {
            // Un reporte repetido con fecha más nueva evidencia que la
            // inspección volvió a ocurrir: avanzar el checkpoint
            if !report_advances_checkpoint(event.reported_date, assignment.last_performed_date) {
                return Ok(());
            }

            let last = Checkpoint {
                date: Some(event.reported_date),
                mileage: assignment.last_performed_mileage,
                engine_hours: assignment.last_performed_engine_hours,
            };
            let state = compute_due_state(&schedule, &last, &current, now);

            assignments
                .update_checkpoints(
                    assignment.id,
                    last.date,
                    last.mileage,
                    last.engine_hours,
                    state.next_due_date,
                    state.next_due_mileage,
                    state.next_due_engine_hours,
                )
                .await?;

            log::info!(
                "📋 Asignación de inspección actualizada para {} ({})",
                vehicle.vin,
                schedule.name
            );
            return Ok(());
        }

        let last = Checkpoint {
            date: Some(event.reported_date),
            mileage: None,
            engine_hours: None,
        };
        let state = compute_due_state(&schedule, &last, &current, now);

        assignments
            .create(
                vehicle.id,
                schedule.id,
                last.date,
                None,
                None,
                state.next_due_date,
                state.next_due_mileage,
                state.next_due_engine_hours,
            )
            .await?;

        log::info!(
            "📋 Asignación de inspección creada para {} ({})",
            vehicle.vin,
            schedule.name
        );
        Ok(())
    }

    /// Recalcular los checkpoints de las asignaciones del vehículo con la
    /// telemetría fresca. Solo persiste si algo cambió.
    async fn recompute_assignments(&self, vehicle_id: Uuid) -> AppResult<()> {
        let vehicles = VehicleRepository::new(self.pool.clone());
        let vehicle = match vehicles.find_by_id(vehicle_id).await? {
            Some(vehicle) => vehicle,
            None => return Ok(()),
        };

        let schedules = ScheduleRepository::new(self.pool.clone());
        let assignments = AssignmentRepository::new(self.pool.clone());
        let current = CurrentReading {
            mileage: vehicle.mileage,
            engine_hours: vehicle.engine_hours,
        };
        let now = Utc::now();

        for assignment in assignments.find_by_vehicle(vehicle_id).await? {
            let schedule = match schedules.find_by_id(assignment.schedule_id).await? {
                Some(schedule) => schedule,
                None => continue,
            };

            let last = Checkpoint {
                date: assignment.last_performed_date,
                mileage: assignment.last_performed_mileage,
                engine_hours: assignment.last_performed_engine_hours,
            };
            let state = compute_due_state(&schedule, &last, &current, now);

            let changed = state.next_due_date != assignment.next_due_date
                || state.next_due_mileage != assignment.next_due_mileage
                || state.next_due_engine_hours != assignment.next_due_engine_hours;

            if changed {
                assignments
                    .update_checkpoints(
                        assignment.id,
                        assignment.last_performed_date,
                        assignment.last_performed_mileage,
                        assignment.last_performed_engine_hours,
                        state.next_due_date,
                        state.next_due_mileage,
                        state.next_due_engine_hours,
                    )
                    .await?;
            }
        }

        Ok(())
    }
}

struct VehicleOutcome {
    created: bool,
    updated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_template_name_collapses_whitespace() {
        assert_eq!(
            normalize_template_name("  Brake   Inspection  "),
            "brake inspection"
        );
        assert_eq!(normalize_template_name("Oil Change"), "oil change");
        assert_eq!(
            normalize_template_name("OIL\tCHANGE"),
            "oil change"
        );
    }

    #[test]
    fn test_normalized_names_match_across_variants() {
        let a = normalize_template_name("Brake Inspection");
        let b = normalize_template_name("  brake   INSPECTION ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_meters_to_miles_rounds_to_nearest() {
        assert_eq!(meters_to_miles(1609.34), 1);
        assert_eq!(meters_to_miles(160934.0), 100);
        assert_eq!(meters_to_miles(804.0), 0);
        assert_eq!(meters_to_miles(805.0), 1);
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_newer_report_advances_checkpoint() {
        let last = Some(utc("2026-01-15T00:00:00Z"));
        assert!(report_advances_checkpoint(utc("2026-04-01T00:00:00Z"), last));
    }

    #[test]
    fn test_stale_or_repeated_report_keeps_checkpoint() {
        let last = Some(utc("2026-01-15T00:00:00Z"));
        assert!(!report_advances_checkpoint(utc("2026-01-15T00:00:00Z"), last));
        assert!(!report_advances_checkpoint(utc("2025-12-01T00:00:00Z"), last));
    }

    #[test]
    fn test_report_advances_checkpoint_without_prior_date() {
        assert!(report_advances_checkpoint(utc("2026-01-15T00:00:00Z"), None));
    }
}
