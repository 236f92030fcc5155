//! Agregador de alertas del dashboard
//!
//! Las alertas son transitorias: se recalculan en cada request a partir de
//! tres fuentes (códigos de diagnóstico sin resolver, inventario bajo
//! mínimo y mantenimiento vencido), acotadas a 5 ítems por categoría, y se
//! devuelven ordenadas por severidad con orden estable.

use chrono::Utc;
use sqlx::PgPool;

use crate::dto::dashboard_dto::{AlertCounts, AlertsResponse};
use crate::models::alert::{parse_severity, Alert, Severity};
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::diagnostic_repository::DiagnosticRepository;
use crate::repositories::part_repository::PartRepository;
use crate::services::due_state::{classify, CurrentReading};
use crate::utils::errors::AppResult;

/// Tope de alertas por categoría
pub const ALERTS_PER_CATEGORY: i64 = 5;

pub struct AlertService {
    pool: PgPool,
}

impl AlertService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn collect(&self) -> AppResult<AlertsResponse> {
        let diagnostic_alerts = self.diagnostic_alerts().await?;
        let inventory_alerts = self.inventory_alerts().await?;
        let maintenance_alerts = self.maintenance_alerts().await?;

        let counts = AlertCounts {
            total: diagnostic_alerts.len() + inventory_alerts.len() + maintenance_alerts.len(),
            diagnostic: diagnostic_alerts.len(),
            inventory: inventory_alerts.len(),
            maintenance: maintenance_alerts.len(),
        };

        let mut alerts = Vec::with_capacity(counts.total);
        alerts.extend(diagnostic_alerts);
        alerts.extend(inventory_alerts);
        alerts.extend(maintenance_alerts);

        Ok(AlertsResponse {
            alerts: rank_alerts(alerts),
            alert_counts: counts,
        })
    }

    async fn diagnostic_alerts(&self) -> AppResult<Vec<Alert>> {
        let diagnostics = DiagnosticRepository::new(self.pool.clone());
        let rows = diagnostics.find_unresolved_recent(ALERTS_PER_CATEGORY).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let vehicle_name = row
                    .vehicle_unit_number
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", row.vehicle_make, row.vehicle_model));
                Alert::DiagnosticCode {
                    code: row.code,
                    description: row.description,
                    vehicle_id: row.vehicle_id,
                    vehicle_name,
                    reported_date: row.reported_date,
                    severity: parse_severity(row.severity.as_deref().unwrap_or("")),
                }
            })
            .collect())
    }

    async fn inventory_alerts(&self) -> AppResult<Vec<Alert>> {
        let parts = PartRepository::new(self.pool.clone());
        let rows = parts.find_low_stock(ALERTS_PER_CATEGORY).await?;

        Ok(rows
            .into_iter()
            .map(|part| {
                // Stock agotado es más urgente que stock bajo
                let severity = if part.quantity_on_hand == 0 {
                    Severity::Critical
                } else {
                    Severity::High
                };
                Alert::LowInventory {
                    part_id: part.id,
                    part_name: part.name,
                    part_number: part.part_number,
                    quantity: part.quantity_on_hand,
                    minimum: part.minimum_quantity,
                    severity,
                }
            })
            .collect())
    }

    async fn maintenance_alerts(&self) -> AppResult<Vec<Alert>> {
        let assignments = AssignmentRepository::new(self.pool.clone());
        let rows = assignments.list_all_with_details().await?;
        let now = Utc::now();

        let mut alerts = Vec::new();
        for row in rows {
            if alerts.len() as i64 >= ALERTS_PER_CATEGORY {
                break;
            }

            let schedule = row.schedule();
            let current = CurrentReading {
                mileage: row.vehicle_mileage,
                engine_hours: row.vehicle_engine_hours,
            };
            let flags = classify(
                &schedule,
                row.next_due_date,
                row.next_due_mileage,
                row.next_due_engine_hours,
                &current,
                now,
            );

            // Solo atrasos severos (> 30 días o > 1000 millas) alertan
            if flags.is_overdue && flags.severity == Some(Severity::High) {
                alerts.push(Alert::OverdueMaintenance {
                    vehicle_id: row.vehicle_id,
                    vehicle_name: row.vehicle_label(),
                    service: schedule.name,
                    due_date: row.next_due_date,
                    due_mileage: row.next_due_mileage,
                    severity: Severity::High,
                });
            }
        }

        Ok(alerts)
    }
}

/// Ordenar alertas por severidad descendente en urgencia
///
/// El sort es estable: dentro de una misma severidad se conserva el orden
/// de llegada (diagnósticos, inventario, mantenimiento).
pub fn rank_alerts(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|a| a.severity().rank());
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn inventory_alert(name: &str, severity: Severity) -> Alert {
        Alert::LowInventory {
            part_id: Uuid::new_v4(),
            part_name: name.to_string(),
            part_number: "P-100".to_string(),
            quantity: 1,
            minimum: 5,
            severity,
        }
    }

    fn name_of(alert: &Alert) -> &str {
        match alert {
            Alert::LowInventory { part_name, .. } => part_name,
            _ => "",
        }
    }

    #[test]
    fn test_rank_alerts_critical_first() {
        let ranked = rank_alerts(vec![
            inventory_alert("low", Severity::Low),
            inventory_alert("critical", Severity::Critical),
            inventory_alert("medium", Severity::Medium),
            inventory_alert("high", Severity::High),
        ]);

        let order: Vec<&str> = ranked.iter().map(name_of).collect();
        assert_eq!(order, vec!["critical", "high", "medium", "low"]);
    }

    #[test]
    fn test_rank_alerts_is_stable_within_severity() {
        let ranked = rank_alerts(vec![
            inventory_alert("first", Severity::Medium),
            inventory_alert("second", Severity::Medium),
            inventory_alert("third", Severity::Medium),
        ]);

        let order: Vec<&str> = ranked.iter().map(name_of).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
