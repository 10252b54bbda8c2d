//! Dashboard counters.

use serde::{Deserialize, Serialize};

use crate::models::{Patient, PatientStatus};

/// Patient counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterStats {
    pub total: usize,
    pub active: usize,
    pub in_treatment: usize,
    pub recovered: usize,
    pub emergency: usize,
    /// Patients with a pending appointment
    pub with_appointment: usize,
}

pub fn roster_stats(roster: &[Patient]) -> RosterStats {
    let mut stats = RosterStats {
        total: roster.len(),
        ..Default::default()
    };
    for patient in roster {
        match patient.status {
            PatientStatus::Active => stats.active += 1,
            PatientStatus::InTreatment => stats.in_treatment += 1,
            PatientStatus::Recovered => stats.recovered += 1,
            PatientStatus::Emergency => stats.emergency += 1,
        }
        if patient.has_appointment() {
            stats.with_appointment += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPatient;

    #[test]
    fn test_counts() {
        let make = |status| {
            Patient::from_new(NewPatient {
                name: "Max".into(),
                status: Some(status),
                ..Default::default()
            })
        };
        let mut roster = vec![
            make(PatientStatus::Active),
            make(PatientStatus::Active),
            make(PatientStatus::Emergency),
            make(PatientStatus::Recovered),
        ];
        roster[2].next_appointment = Some(chrono::Utc::now());

        let stats = roster_stats(&roster);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.in_treatment, 0);
        assert_eq!(stats.recovered, 1);
        assert_eq!(stats.emergency, 1);
        assert_eq!(stats.with_appointment, 1);
    }

    #[test]
    fn test_empty() {
        assert_eq!(roster_stats(&[]), RosterStats::default());
    }
}
