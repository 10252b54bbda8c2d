//! Display filtering and ordering for the patient list.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Patient, PatientStatus, UnknownVariant};

/// Status chip selected on the patient list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PatientStatus),
}

impl StatusFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => patient.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse()
            .map(StatusFilter::Only)
            .map_err(|_| UnknownVariant {
                kind: "status filter",
                value: s.to_string(),
            })
    }
}

/// Filter and order a roster for display.
///
/// Search is a case-insensitive substring match over name, owner name,
/// owner email, species, breed and symptoms; a blank query matches
/// everything. The status filter is applied on top of the search. The
/// result lists emergencies first, then newest `date_created` first;
/// ties keep roster order.
pub fn filter_roster(roster: &[Patient], search: &str, status: StatusFilter) -> Vec<Patient> {
    let mut filtered: Vec<Patient> = search_iter(roster, search)
        .filter(|p| status.matches(p))
        .cloned()
        .collect();
    filtered.sort_by(display_order);
    filtered
}

/// Search step only, in roster order.
pub fn search_roster(roster: &[Patient], query: &str) -> Vec<Patient> {
    search_iter(roster, query).cloned().collect()
}

fn search_iter<'a>(roster: &'a [Patient], query: &str) -> impl Iterator<Item = &'a Patient> {
    let needle = if query.trim().is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    };
    roster.iter().filter(move |p| match &needle {
        None => true,
        Some(needle) => matches_search(p, needle),
    })
}

fn matches_search(patient: &Patient, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&patient.name)
        || contains(&patient.owner_name)
        || contains(&patient.owner_email)
        || contains(&patient.species)
        || patient.breed.as_deref().is_some_and(contains)
        || contains(&patient.symptoms)
}

/// Emergencies first, then most recently created.
pub fn display_order(a: &Patient, b: &Patient) -> Ordering {
    b.is_emergency()
        .cmp(&a.is_emergency())
        .then_with(|| b.date_created.cmp(&a.date_created))
}

/// Field filters for advanced patient lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientFilters {
    /// Exact species match
    pub species: Option<String>,
    pub status: Option<PatientStatus>,
    /// Case-insensitive substring of the owner name
    pub owner_name: Option<String>,
    /// Inclusive lower bound on `date_created`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `date_created`
    pub date_to: Option<DateTime<Utc>>,
}

impl PatientFilters {
    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(species) = &self.species {
            if &patient.species != species {
                return false;
            }
        }
        if let Some(status) = self.status {
            if patient.status != status {
                return false;
            }
        }
        if let Some(owner) = &self.owner_name {
            if !patient
                .owner_name
                .to_lowercase()
                .contains(&owner.to_lowercase())
            {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if patient.date_created < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if patient.date_created > to {
                return false;
            }
        }
        true
    }
}

/// Apply field filters, keeping roster order.
pub fn apply_filters(roster: &[Patient], filters: &PatientFilters) -> Vec<Patient> {
    roster
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPatient;
    use chrono::{Duration, TimeZone};

    fn make_patient(id: &str, name: &str, status: PatientStatus, day: u32) -> Patient {
        let mut patient = Patient::from_new(NewPatient {
            name: name.into(),
            species: "Perro".into(),
            owner_name: "Luis Hernandez".into(),
            owner_email: "luis@example.com".into(),
            symptoms: "Vomiting".into(),
            status: Some(status),
            ..Default::default()
        });
        patient.id = id.into();
        patient.date_created = Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
        patient
    }

    fn ids(patients: &[Patient]) -> Vec<&str> {
        patients.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_roster() {
        assert!(filter_roster(&[], "max", StatusFilter::All).is_empty());
    }

    #[test]
    fn test_emergency_sorts_first() {
        let roster = vec![
            make_patient("a", "Thor", PatientStatus::Active, 10),
            make_patient("b", "Rocky", PatientStatus::Emergency, 2),
        ];
        let result = filter_roster(&roster, "", StatusFilter::All);
        assert_eq!(ids(&result), ["b", "a"]);
    }

    #[test]
    fn test_newest_first_within_group() {
        let roster = vec![
            make_patient("old", "A", PatientStatus::Active, 1),
            make_patient("new", "B", PatientStatus::Recovered, 20),
            make_patient("e-old", "C", PatientStatus::Emergency, 3),
            make_patient("mid", "D", PatientStatus::InTreatment, 10),
            make_patient("e-new", "E", PatientStatus::Emergency, 15),
        ];
        let result = filter_roster(&roster, "  ", StatusFilter::All);
        assert_eq!(ids(&result), ["e-new", "e-old", "new", "mid", "old"]);
    }

    #[test]
    fn test_equal_dates_keep_roster_order() {
        let roster = vec![
            make_patient("first", "A", PatientStatus::Active, 5),
            make_patient("second", "B", PatientStatus::Active, 5),
        ];
        let result = filter_roster(&roster, "", StatusFilter::All);
        assert_eq!(ids(&result), ["first", "second"]);
    }

    #[test]
    fn test_search_fields() {
        let mut misha = make_patient("m", "Misha", PatientStatus::Active, 1);
        misha.species = "Gato".into();
        misha.breed = Some("Siames".into());
        misha.owner_name = "Sofia Torres".into();
        misha.owner_email = "sofia@correo.mx".into();
        misha.symptoms = "Perdida de peso".into();
        let roster = vec![misha, make_patient("t", "Thor", PatientStatus::Active, 2)];

        for query in ["misha", "GATO", "siam", "torres", "correo.mx", "peso"] {
            let result = filter_roster(&roster, query, StatusFilter::All);
            assert_eq!(ids(&result), ["m"], "query {query:?}");
        }
    }

    #[test]
    fn test_search_does_not_match_other_fields() {
        let mut patient = make_patient("p", "Nube", PatientStatus::Active, 1);
        patient.diagnosis = Some("Abscess".into());
        patient.notes = Some("Bites".into());
        let roster = vec![patient];

        assert!(filter_roster(&roster, "abscess", StatusFilter::All).is_empty());
        assert!(filter_roster(&roster, "bites", StatusFilter::All).is_empty());
    }

    #[test]
    fn test_status_filter_intersects_search() {
        let roster = vec![
            make_patient("a", "Max", PatientStatus::Active, 1),
            make_patient("b", "Maxine", PatientStatus::Emergency, 2),
            make_patient("c", "Luna", PatientStatus::Emergency, 3),
        ];
        let result = filter_roster(&roster, "max", StatusFilter::Only(PatientStatus::Emergency));
        assert_eq!(ids(&result), ["b"]);
    }

    #[test]
    fn test_no_match() {
        let roster = vec![make_patient("a", "Max", PatientStatus::Active, 1)];
        assert!(filter_roster(&roster, "zzz", StatusFilter::All).is_empty());
    }

    #[test]
    fn test_input_untouched() {
        let roster = vec![
            make_patient("a", "Thor", PatientStatus::Active, 10),
            make_patient("b", "Rocky", PatientStatus::Emergency, 2),
        ];
        let before = roster.clone();
        filter_roster(&roster, "", StatusFilter::All);
        assert_eq!(roster, before);
    }

    #[test]
    fn test_search_roster_keeps_order() {
        let roster = vec![
            make_patient("a", "Max", PatientStatus::Active, 1),
            make_patient("b", "Maxine", PatientStatus::Emergency, 2),
        ];
        assert_eq!(ids(&search_roster(&roster, "MAX")), ["a", "b"]);
        assert_eq!(search_roster(&roster, "").len(), 2);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse(), Ok(StatusFilter::All));
        assert_eq!(
            "in_treatment".parse(),
            Ok(StatusFilter::Only(PatientStatus::InTreatment))
        );
        assert!("ALL".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_apply_filters() {
        let mut cat = make_patient("cat", "Misha", PatientStatus::InTreatment, 10);
        cat.species = "Gato".into();
        cat.owner_name = "Sofia Torres".into();
        let roster = vec![
            make_patient("dog", "Rocky", PatientStatus::Emergency, 1),
            cat,
        ];

        let filters = PatientFilters {
            species: Some("Gato".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&roster, &filters)), ["cat"]);

        let filters = PatientFilters {
            owner_name: Some("torres".into()),
            status: Some(PatientStatus::InTreatment),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&roster, &filters)), ["cat"]);

        // Bounds are inclusive
        let day_one = roster[0].date_created;
        let filters = PatientFilters {
            date_from: Some(day_one),
            date_to: Some(day_one + Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&roster, &filters)), ["dog"]);

        assert_eq!(apply_filters(&roster, &PatientFilters::default()).len(), 2);
    }
}
