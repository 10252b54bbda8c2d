//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinical status of a patient.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// Routine care
    #[default]
    Active,
    /// Currently under treatment
    InTreatment,
    /// Discharged / recovered
    Recovered,
    /// Needs immediate attention, always listed first
    Emergency,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Active,
        PatientStatus::InTreatment,
        PatientStatus::Recovered,
        PatientStatus::Emergency,
    ];

    /// Stable string form used by storage and the FFI.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::InTreatment => "in_treatment",
            PatientStatus::Recovered => "recovered",
            PatientStatus::Emergency => "emergency",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings that name no known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for PatientStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PatientStatus::Active),
            "in_treatment" => Ok(PatientStatus::InTreatment),
            "recovered" => Ok(PatientStatus::Recovered),
            "emergency" => Ok(PatientStatus::Emergency),
            _ => Err(UnknownVariant {
                kind: "patient status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(UnknownVariant {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// A single animal under the clinic's care.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Stable unique ID, assigned at creation
    pub id: String,
    /// Patient name
    pub name: String,
    /// Species (e.g., "canine", "feline")
    pub species: String,
    pub breed: Option<String>,
    /// Age in years
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Owner/client name
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    /// Presenting symptoms (required)
    pub symptoms: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    /// Creation timestamp, never changes
    pub date_created: DateTime<Utc>,
    /// Refreshed on every edit
    pub last_visit: Option<DateTime<Utc>>,
    /// Drives the appointment reminder for this patient
    pub next_appointment: Option<DateTime<Utc>>,
    /// Opaque photo references, append/remove only
    pub photos: Vec<String>,
    pub status: PatientStatus,
}

impl Patient {
    /// Create a patient from form input, assigning identity and timestamps.
    pub fn from_new(input: NewPatient) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            species: input.species,
            breed: input.breed,
            age: input.age,
            gender: input.gender,
            owner_name: input.owner_name,
            owner_email: input.owner_email,
            owner_phone: input.owner_phone,
            symptoms: input.symptoms,
            diagnosis: input.diagnosis,
            treatment: input.treatment,
            notes: input.notes,
            date_created: now,
            last_visit: Some(now),
            next_appointment: input.next_appointment,
            photos: Vec::new(),
            status: input.status.unwrap_or_default(),
        }
    }

    /// Apply a patch. `id` and `date_created` are untouched; `last_visit` is refreshed.
    pub fn apply(&mut self, patch: PatientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(species) = patch.species {
            self.species = species;
        }
        if let Some(breed) = patch.breed {
            self.breed = breed;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(owner_name) = patch.owner_name {
            self.owner_name = owner_name;
        }
        if let Some(owner_email) = patch.owner_email {
            self.owner_email = owner_email;
        }
        if let Some(owner_phone) = patch.owner_phone {
            self.owner_phone = owner_phone;
        }
        if let Some(symptoms) = patch.symptoms {
            self.symptoms = symptoms;
        }
        if let Some(diagnosis) = patch.diagnosis {
            self.diagnosis = diagnosis;
        }
        if let Some(treatment) = patch.treatment {
            self.treatment = treatment;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(next_appointment) = patch.next_appointment {
            self.next_appointment = next_appointment;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.last_visit = Some(Utc::now());
    }

    pub fn is_emergency(&self) -> bool {
        self.status == PatientStatus::Emergency
    }

    pub fn has_appointment(&self) -> bool {
        self.next_appointment.is_some()
    }
}

/// Input for creating a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub symptoms: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub next_appointment: Option<DateTime<Utc>>,
    /// Defaults to `Active`
    pub status: Option<PatientStatus>,
}

/// Partial update for a patient.
///
/// Nullable fields are `Option<Option<T>>`: `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<Option<String>>,
    pub age: Option<Option<u32>>,
    pub gender: Option<Option<Gender>>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<Option<String>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<Option<String>>,
    pub treatment: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub next_appointment: Option<Option<DateTime<Utc>>>,
    pub status: Option<PatientStatus>,
}

impl PatientPatch {
    /// Patch that only changes the appointment.
    pub fn appointment(at: Option<DateTime<Utc>>) -> Self {
        Self {
            next_appointment: Some(at),
            ..Default::default()
        }
    }

    /// Patch that only changes the status.
    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_input() -> NewPatient {
        NewPatient {
            name: "Rocky".into(),
            species: "canine".into(),
            breed: Some("Boxer".into()),
            owner_name: "Luis Hernandez".into(),
            owner_email: "luis@example.com".into(),
            symptoms: "Vomiting and lethargy".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_new_assigns_identity() {
        let patient = Patient::from_new(make_input());
        assert_eq!(patient.id.len(), 36); // UUID format
        assert_eq!(patient.status, PatientStatus::Active);
        assert_eq!(patient.last_visit, Some(patient.date_created));
        assert!(patient.photos.is_empty());
        assert!(!patient.has_appointment());
    }

    #[test]
    fn test_from_new_keeps_explicit_status() {
        let mut input = make_input();
        input.status = Some(PatientStatus::Emergency);
        let patient = Patient::from_new(input);
        assert!(patient.is_emergency());
    }

    #[test]
    fn test_apply_patch() {
        let mut patient = Patient::from_new(make_input());
        let id = patient.id.clone();
        let created = patient.date_created;
        let appointment = Utc::now() + Duration::days(1);

        patient.apply(PatientPatch {
            diagnosis: Some(Some("Foreign body".into())),
            breed: Some(None),
            next_appointment: Some(Some(appointment)),
            ..Default::default()
        });

        assert_eq!(patient.id, id);
        assert_eq!(patient.date_created, created);
        assert_eq!(patient.diagnosis.as_deref(), Some("Foreign body"));
        assert_eq!(patient.breed, None);
        assert_eq!(patient.next_appointment, Some(appointment));
        // Untouched
        assert_eq!(patient.name, "Rocky");
    }

    #[test]
    fn test_apply_refreshes_last_visit() {
        let mut patient = Patient::from_new(make_input());
        patient.last_visit = None;
        patient.apply(PatientPatch::default());
        assert!(patient.last_visit.is_some());
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in PatientStatus::ALL {
            assert_eq!(status.as_str().parse::<PatientStatus>(), Ok(status));
        }
        assert!("critical".parse::<PatientStatus>().is_err());
        assert!("Active".parse::<PatientStatus>().is_err());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&PatientStatus::InTreatment).unwrap();
        assert_eq!(json, "\"in_treatment\"");
    }
}
