//! Snapshot diffing for appointment reminders.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::reminder_key;
use crate::models::Patient;

/// A reminder to be scheduled for a patient's next appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub patient_id: String,
    pub patient_name: String,
    pub key: u32,
    pub fire_at: DateTime<Utc>,
}

/// One change to push to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderAction {
    /// Schedule, or replace the pending reminder under the same key
    Schedule(Reminder),
    Cancel { patient_id: String, key: u32 },
}

impl ReminderAction {
    pub fn patient_id(&self) -> &str {
        match self {
            ReminderAction::Schedule(reminder) => &reminder.patient_id,
            ReminderAction::Cancel { patient_id, .. } => patient_id,
        }
    }

    pub fn key(&self) -> u32 {
        match self {
            ReminderAction::Schedule(reminder) => reminder.key,
            ReminderAction::Cancel { key, .. } => *key,
        }
    }

    pub fn schedule(patient: &Patient, fire_at: DateTime<Utc>) -> Self {
        ReminderAction::Schedule(Reminder {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            key: reminder_key(&patient.id),
            fire_at,
        })
    }

    pub fn cancel(patient_id: &str) -> Self {
        ReminderAction::Cancel {
            patient_id: patient_id.to_string(),
            key: reminder_key(patient_id),
        }
    }
}

/// Compare two roster snapshots and emit the reminder changes between them.
///
/// - new patient with an appointment → schedule
/// - appointment set or moved → schedule (replaces any pending reminder)
/// - appointment cleared → cancel
/// - patient removed while holding an appointment → cancel
///
/// At most one action per patient.
pub fn reconcile(previous: &[Patient], current: &[Patient]) -> Vec<ReminderAction> {
    let before: HashMap<&str, &Patient> = previous.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());
    let mut actions = Vec::new();

    for curr in current {
        if !seen.insert(curr.id.as_str()) {
            continue;
        }
        let prev_appointment = before.get(curr.id.as_str()).and_then(|p| p.next_appointment);

        match (prev_appointment, curr.next_appointment) {
            (prev, Some(next)) if prev != Some(next) => {
                actions.push(ReminderAction::schedule(curr, next));
            }
            (Some(_), None) => actions.push(ReminderAction::cancel(&curr.id)),
            _ => {}
        }
    }

    for prev in previous {
        if prev.has_appointment() && !seen.contains(prev.id.as_str()) {
            seen.insert(prev.id.as_str());
            actions.push(ReminderAction::cancel(&prev.id));
        }
    }

    actions
}
