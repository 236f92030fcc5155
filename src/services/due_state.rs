//! Calculadora de estado de vencimiento
//!
//! Función pura central del sistema: dado un template de mantenimiento, el
//! último checkpoint realizado y la lectura actual del vehículo, calcula
//! los próximos checkpoints, los flags overdue/due-soon y la severidad.
//! Cada dimensión (millas, calendario, horas de motor) se evalúa de forma
//! independiente; la primera que dispare gobierna ("whichever comes
//! first"). Sin efectos secundarios: la validación del template ocurre al
//! crearlo, no aquí.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::alert::Severity;
use crate::models::maintenance::MaintenanceSchedule;

/// Banda de proximidad para due-soon en millas
pub const DUE_SOON_MILEAGE_BAND: i32 = 500;
/// Ventana de due-soon en días de calendario
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;
/// Banda de proximidad para due-soon en horas de motor
pub const DUE_SOON_ENGINE_HOURS_BAND: i64 = 50;

// Bandas de severidad por magnitud de atraso (estrictas: > umbral)
const OVERDUE_MILES_HIGH: i32 = 1000;
const OVERDUE_MILES_MEDIUM: i32 = 500;
const OVERDUE_DAYS_HIGH: i64 = 30;
const OVERDUE_DAYS_MEDIUM: i64 = 14;
const OVERDUE_HOURS_HIGH: i64 = 100;
const OVERDUE_HOURS_MEDIUM: i64 = 50;

/// Último checkpoint realizado de una asignación
#[derive(Debug, Clone, Copy, Default)]
pub struct Checkpoint {
    pub date: Option<DateTime<Utc>>,
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
}

/// Lectura actual del vehículo
///
/// Un campo en None es indeterminado: esa dimensión no aporta señal de
/// vencimiento (evita falsas alarmas por telemetría faltante).
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentReading {
    pub mileage: Option<i32>,
    pub engine_hours: Option<Decimal>,
}

/// Flags de vencimiento de una asignación
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueFlags {
    pub is_overdue: bool,
    pub is_due_soon: bool,
    /// Severidad de la dimensión más urgente; None si no hay atraso
    pub severity: Option<Severity>,
}

/// Resultado completo: próximos checkpoints más clasificación
#[derive(Debug, Clone, PartialEq)]
pub struct DueState {
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_due_mileage: Option<i32>,
    pub next_due_engine_hours: Option<Decimal>,
    pub is_overdue: bool,
    pub is_due_soon: bool,
    pub severity: Option<Severity>,
}

/// Calcular los próximos checkpoints para las dimensiones habilitadas
///
/// Millas y horas caen a la lectura actual del vehículo (o a cero) cuando
/// no hay último checkpoint; el calendario cae a `now`.
pub fn next_checkpoints(
    schedule: &MaintenanceSchedule,
    last: &Checkpoint,
    current: &CurrentReading,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<i32>, Option<Decimal>) {
    let next_date = match (schedule.is_time_based, schedule.time_interval_days) {
        (true, Some(days)) => Some(last.date.unwrap_or(now) + Duration::days(days as i64)),
        _ => None,
    };

    let next_mileage = match (schedule.is_mileage_based, schedule.mileage_interval) {
        (true, Some(interval)) => {
            let base = last.mileage.or(current.mileage).unwrap_or(0);
            Some(base + interval)
        }
        _ => None,
    };

    let next_engine_hours = match (schedule.is_engine_hours_based, schedule.engine_hours_interval) {
        (true, Some(interval)) => {
            let base = last
                .engine_hours
                .or(current.engine_hours)
                .unwrap_or(Decimal::ZERO);
            Some(base + interval)
        }
        _ => None,
    };

    (next_date, next_mileage, next_engine_hours)
}

/// Clasificar una asignación contra los checkpoints almacenados
///
/// overdue es estricto (lectura actual exactamente igual al checkpoint no
/// está vencida); due-soon requiere estar dentro de la banda de proximidad
/// sin haber llegado al checkpoint. El OR lógico cruza dimensiones y la
/// severidad reportada es la más urgente encontrada.
pub fn classify(
    schedule: &MaintenanceSchedule,
    next_due_date: Option<DateTime<Utc>>,
    next_due_mileage: Option<i32>,
    next_due_engine_hours: Option<Decimal>,
    current: &CurrentReading,
    now: DateTime<Utc>,
) -> DueFlags {
    let mut is_overdue = false;
    let mut is_due_soon = false;
    let mut severity: Option<Severity> = None;

    let mut record_overdue = |sev: Severity| {
        is_overdue = true;
        severity = Some(match severity {
            Some(current_sev) => current_sev.most_urgent(sev),
            None => sev,
        });
    };

    // Dimensión de millas
    if schedule.is_mileage_based {
        if let (Some(next), Some(mileage)) = (next_due_mileage, current.mileage) {
            if mileage > next {
                let miles_overdue = mileage - next;
                record_overdue(if miles_overdue > OVERDUE_MILES_HIGH {
                    Severity::High
                } else if miles_overdue > OVERDUE_MILES_MEDIUM {
                    Severity::Medium
                } else {
                    Severity::Low
                });
            } else {
                let remaining = next - mileage;
                if remaining > 0 && remaining <= DUE_SOON_MILEAGE_BAND {
                    is_due_soon = true;
                }
            }
        }
    }

    // Dimensión de calendario
    if schedule.is_time_based {
        if let Some(next) = next_due_date {
            if now > next {
                let days_overdue = (now - next).num_days();
                record_overdue(if days_overdue > OVERDUE_DAYS_HIGH {
                    Severity::High
                } else if days_overdue > OVERDUE_DAYS_MEDIUM {
                    Severity::Medium
                } else {
                    Severity::Low
                });
            } else {
                let remaining = next - now;
                if remaining > Duration::zero() && remaining <= Duration::days(DUE_SOON_WINDOW_DAYS)
                {
                    is_due_soon = true;
                }
            }
        }
    }

    // Dimensión de horas de motor
    if schedule.is_engine_hours_based {
        if let (Some(next), Some(hours)) = (next_due_engine_hours, current.engine_hours) {
            if hours > next {
                let hours_overdue = hours - next;
                record_overdue(if hours_overdue > Decimal::from(OVERDUE_HOURS_HIGH) {
                    Severity::High
                } else if hours_overdue > Decimal::from(OVERDUE_HOURS_MEDIUM) {
                    Severity::Medium
                } else {
                    Severity::Low
                });
            } else {
                let remaining = next - hours;
                if remaining > Decimal::ZERO
                    && remaining <= Decimal::from(DUE_SOON_ENGINE_HOURS_BAND)
                {
                    is_due_soon = true;
                }
            }
        }
    }

    DueFlags {
        is_overdue,
        is_due_soon,
        severity,
    }
}

/// Contrato principal: checkpoints siguientes + clasificación en un paso
pub fn compute_due_state(
    schedule: &MaintenanceSchedule,
    last: &Checkpoint,
    current: &CurrentReading,
    now: DateTime<Utc>,
) -> DueState {
    let (next_due_date, next_due_mileage, next_due_engine_hours) =
        next_checkpoints(schedule, last, current, now);

    let flags = classify(
        schedule,
        next_due_date,
        next_due_mileage,
        next_due_engine_hours,
        current,
        now,
    );

    DueState {
        next_due_date,
        next_due_mileage,
        next_due_engine_hours,
        is_overdue: flags.is_overdue,
        is_due_soon: flags.is_due_soon,
        severity: flags.severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn schedule(
        mileage: Option<i32>,
        days: Option<i32>,
        hours: Option<Decimal>,
    ) -> MaintenanceSchedule {
        let now = Utc::now();
        MaintenanceSchedule {
            id: Uuid::new_v4(),
            name: "Oil Change".to_string(),
            description: None,
            is_mileage_based: mileage.is_some(),
            is_time_based: days.is_some(),
            is_engine_hours_based: hours.is_some(),
            mileage_interval: mileage,
            time_interval_days: days,
            engine_hours_interval: hours,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_next_mileage_seeds_from_last_performed() {
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: Some(12_000),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert_eq!(state.next_due_mileage, Some(15_000));
    }

    #[test]
    fn test_next_mileage_falls_back_to_vehicle_then_zero() {
        let s = schedule(Some(5000), None, None);
        let current = CurrentReading {
            mileage: Some(8_000),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &Checkpoint::default(), &current, Utc::now());
        assert_eq!(state.next_due_mileage, Some(13_000));

        let state = compute_due_state(
            &s,
            &Checkpoint::default(),
            &CurrentReading::default(),
            Utc::now(),
        );
        assert_eq!(state.next_due_mileage, Some(5_000));
    }

    #[test]
    fn test_mileage_boundary_one_mile_before_due() {
        // current == next - 1: due soon, nunca overdue
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: Some(14_999),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert!(state.is_due_soon);
        assert!(!state.is_overdue);
    }

    #[test]
    fn test_mileage_outside_proximity_band_is_not_due_soon() {
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: Some(14_499),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert!(!state.is_due_soon);
        assert!(!state.is_overdue);
    }

    #[test]
    fn test_mileage_equal_to_checkpoint_is_not_overdue() {
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: Some(15_000),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert!(!state.is_overdue);
    }

    #[test]
    fn test_unknown_vehicle_mileage_is_indeterminate() {
        // telemetría faltante no genera señal de vencimiento
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let state = compute_due_state(&s, &last, &CurrentReading::default(), Utc::now());
        assert_eq!(state.next_due_mileage, Some(15_000));
        assert!(!state.is_overdue);
        assert!(!state.is_due_soon);
        assert_eq!(state.severity, None);
    }

    #[test]
    fn test_overdue_by_exactly_1000_miles_is_medium() {
        // frontera High/Medium: High requiere estrictamente más de 1000
        let s = schedule(Some(5000), None, None);
        let last = Checkpoint {
            mileage: Some(10_000),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: Some(16_000),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert_eq!(state.next_due_mileage, Some(15_000));
        assert!(state.is_overdue);
        assert_eq!(state.severity, Some(Severity::Medium));

        let current = CurrentReading {
            mileage: Some(16_001),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert_eq!(state.severity, Some(Severity::High));
    }

    #[test]
    fn test_time_based_overdue_flips_exactly_at_next_date() {
        let s = schedule(None, Some(365), None);
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(365)),
            ..Default::default()
        };
        // next_due == now: todavía no vencida
        let state = compute_due_state(&s, &last, &CurrentReading::default(), now);
        assert!(!state.is_overdue);

        // un segundo después del checkpoint: vencida
        let state = compute_due_state(
            &s,
            &last,
            &CurrentReading::default(),
            now + Duration::seconds(1),
        );
        assert!(state.is_overdue);
    }

    #[test]
    fn test_time_based_35_days_overdue_is_high() {
        let s = schedule(None, Some(365), None);
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(400)),
            ..Default::default()
        };
        let state = compute_due_state(&s, &last, &CurrentReading::default(), now);
        assert_eq!(state.next_due_date, Some(now - Duration::days(35)));
        assert!(state.is_overdue);
        assert_eq!(state.severity, Some(Severity::High));
    }

    #[test]
    fn test_time_based_due_soon_within_seven_days() {
        let s = schedule(None, Some(30), None);
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(25)),
            ..Default::default()
        };
        let state = compute_due_state(&s, &last, &CurrentReading::default(), now);
        assert!(state.is_due_soon);
        assert!(!state.is_overdue);
    }

    #[test]
    fn test_engine_hours_due_soon_band() {
        let s = schedule(None, None, Some(Decimal::from(250)));
        let last = Checkpoint {
            engine_hours: Some(Decimal::from(1000)),
            ..Default::default()
        };
        let current = CurrentReading {
            mileage: None,
            engine_hours: Some(Decimal::from(1210)),
        };
        let state = compute_due_state(&s, &last, &current, Utc::now());
        assert_eq!(state.next_due_engine_hours, Some(Decimal::from(1250)));
        assert!(state.is_due_soon);
        assert!(!state.is_overdue);
    }

    #[test]
    fn test_multiple_dimensions_whichever_fires_first() {
        // millas al día pero calendario vencido: el OR global es overdue
        let s = schedule(Some(5000), Some(90), None);
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(120)),
            mileage: Some(10_000),
            engine_hours: None,
        };
        let current = CurrentReading {
            mileage: Some(11_000),
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, now);
        assert!(state.is_overdue);
        // 30 días de atraso exactos no superan la banda High
        assert_eq!(state.severity, Some(Severity::Low));
    }

    #[test]
    fn test_severity_takes_most_urgent_dimension() {
        let s = schedule(Some(5000), Some(90), None);
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(130)), // 40 días de atraso -> High
            mileage: Some(10_000),
            engine_hours: None,
        };
        let current = CurrentReading {
            mileage: Some(15_600), // 600 millas de atraso -> Medium
            engine_hours: None,
        };
        let state = compute_due_state(&s, &last, &current, now);
        assert_eq!(state.severity, Some(Severity::High));
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let s = schedule(Some(5000), Some(90), Some(Decimal::from(250)));
        let now = Utc::now();
        let last = Checkpoint {
            date: Some(now - Duration::days(10)),
            mileage: Some(10_000),
            engine_hours: Some(Decimal::from(1000)),
        };
        let current = CurrentReading {
            mileage: Some(11_000),
            engine_hours: Some(Decimal::new(10500, 1)),
        };
        let first = compute_due_state(&s, &last, &current, now);
        let second = compute_due_state(&s, &last, &current, now);
        assert_eq!(first, second);
    }
}
