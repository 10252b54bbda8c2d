//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use vetpoint_core::models::{NewPatient, Patient, PatientStatus};
use vetpoint_core::reminders::{ReminderPayload, ReminderScheduler, SchedulingError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Schedule {
        key: u32,
        fire_at: DateTime<Utc>,
        body: String,
    },
    Cancel {
        key: u32,
    },
}

/// Scheduler that records every call, optionally refusing to schedule.
#[derive(Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<Call>>,
    pub deny: bool,
}

impl RecordingScheduler {
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Default::default()
        }
    }

    /// Drain the calls recorded so far.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule(
        &self,
        key: u32,
        fire_at: DateTime<Utc>,
        payload: &ReminderPayload,
    ) -> Result<(), SchedulingError> {
        if self.deny {
            return Err(SchedulingError::PermissionDenied);
        }
        self.calls.lock().unwrap().push(Call::Schedule {
            key,
            fire_at,
            body: payload.body.clone(),
        });
        Ok(())
    }

    fn cancel(&self, key: u32) -> Result<(), SchedulingError> {
        self.calls.lock().unwrap().push(Call::Cancel { key });
        Ok(())
    }
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn new_patient(name: &str) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        species: "Perro".to_string(),
        breed: Some("Labrador".to_string()),
        owner_name: "Ana Torres".to_string(),
        owner_email: "ana@example.com".to_string(),
        owner_phone: Some("5551234567".to_string()),
        symptoms: "Coughing".to_string(),
        ..Default::default()
    }
}

/// A stored-looking patient with a fixed id and creation date.
pub fn patient(id: &str, status: PatientStatus, created: DateTime<Utc>) -> Patient {
    let mut patient = Patient::from_new(NewPatient {
        status: Some(status),
        ..new_patient(&format!("Patient {id}"))
    });
    patient.id = id.to_string();
    patient.date_created = created;
    patient
}
