//! Severidad y alertas del dashboard
//!
//! Las alertas son transitorias: se recalculan en cada request y nunca se
//! persisten. El orden total de severidad es Critical < High < Medium < Low
//! (clave de orden ascendente).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Severidad usada para códigos de diagnóstico y alertas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Clave de orden ascendente: Critical primero
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    /// La más urgente de dos severidades
    pub fn most_urgent(self, other: Severity) -> Severity {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(()),
        }
    }
}

/// Parsear severidad almacenada como texto; valores desconocidos caen a Medium
pub fn parse_severity(value: &str) -> Severity {
    Severity::from_str(value).unwrap_or(Severity::Medium)
}

/// Alerta transitoria: unión discriminada sobre las tres fuentes
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alert {
    DiagnosticCode {
        code: String,
        description: Option<String>,
        vehicle_id: Uuid,
        vehicle_name: String,
        reported_date: DateTime<Utc>,
        severity: Severity,
    },
    LowInventory {
        part_id: Uuid,
        part_name: String,
        part_number: String,
        quantity: i32,
        minimum: i32,
        severity: Severity,
    },
    OverdueMaintenance {
        vehicle_id: Uuid,
        vehicle_name: String,
        service: String,
        due_date: Option<DateTime<Utc>>,
        due_mileage: Option<i32>,
        severity: Severity,
    },
}

impl Alert {
    pub fn severity(&self) -> Severity {
        match self {
            Alert::DiagnosticCode { severity, .. } => *severity,
            Alert::LowInventory { severity, .. } => *severity,
            Alert::OverdueMaintenance { severity, .. } => *severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_orders_critical_first() {
        assert!(Severity::Critical.rank() < Severity::High.rank());
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_parse_severity_defaults_to_medium() {
        assert_eq!(parse_severity("High"), Severity::High);
        assert_eq!(parse_severity("critical"), Severity::Critical);
        assert_eq!(parse_severity("garbage"), Severity::Medium);
        assert_eq!(parse_severity(""), Severity::Medium);
    }

    #[test]
    fn test_most_urgent() {
        assert_eq!(Severity::Low.most_urgent(Severity::High), Severity::High);
        assert_eq!(Severity::Critical.most_urgent(Severity::Low), Severity::Critical);
    }
}
