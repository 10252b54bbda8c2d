//! Appointment reminders.
//!
//! Pipeline: roster snapshot change → [`reconcile`] → [`dispatch`] → platform scheduler
//!
//! Reminders are a best-effort side channel. A scheduler failure is logged
//! and swallowed; it never rolls back the roster change that caused it.

mod dispatch;
mod reconcile;

pub use dispatch::*;
pub use reconcile::*;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Failure reported by the platform notification facility.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}

/// What the user sees when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPayload {
    pub channel_id: String,
    pub title: String,
    pub body: String,
}

/// Platform notification facility.
///
/// Scheduling under a key that already has a pending reminder replaces it.
pub trait ReminderScheduler: Send + Sync {
    fn schedule(
        &self,
        key: u32,
        fire_at: DateTime<Utc>,
        payload: &ReminderPayload,
    ) -> Result<(), SchedulingError>;

    fn cancel(&self, key: u32) -> Result<(), SchedulingError>;
}

/// Derive the scheduler key for a patient.
///
/// First four bytes of SHA-256 of the id, masked to 31 bits so the key is a
/// positive `i32` on every platform API.
pub fn reminder_key(patient_id: &str) -> u32 {
    let digest = Sha256::digest(patient_id.as_bytes());
    let bytes = [digest[0], digest[1], digest[2], digest[3]];
    u32::from_be_bytes(bytes) & 0x7fff_ffff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deterministic() {
        assert_eq!(reminder_key("patient-1"), reminder_key("patient-1"));
        assert_ne!(reminder_key("patient-1"), reminder_key("patient-2"));
    }

    #[test]
    fn test_key_fits_i32() {
        for id in ["", "a", "9f1c2e4a-0000-4000-8000-000000000000", "ñandú"] {
            assert!(reminder_key(id) <= i32::MAX as u32);
        }
    }

    #[test]
    fn test_key_known_value() {
        // SHA-256("") = e3b0c442...
        assert_eq!(reminder_key(""), 0x63b0_c442);
    }
}
