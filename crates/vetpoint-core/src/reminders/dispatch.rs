//! Delivery of reminder actions to the platform scheduler.

use super::{ReminderAction, ReminderPayload, ReminderScheduler};
use crate::config::ReminderConfig;

impl ReminderConfig {
    /// Build the notification content for a patient.
    pub fn payload_for(&self, patient_name: &str) -> ReminderPayload {
        ReminderPayload {
            channel_id: self.channel_id.clone(),
            title: self.title.clone(),
            body: self.render_body(patient_name),
        }
    }
}

/// Send reminder actions to the scheduler.
///
/// Failures are logged and skipped. Returns how many actions failed.
pub fn dispatch(
    actions: &[ReminderAction],
    scheduler: &dyn ReminderScheduler,
    config: &ReminderConfig,
) -> usize {
    let mut failed = 0;

    for action in actions {
        let result = match action {
            ReminderAction::Schedule(reminder) => {
                let payload = config.payload_for(&reminder.patient_name);
                scheduler.schedule(reminder.key, reminder.fire_at, &payload)
            }
            ReminderAction::Cancel { key, .. } => scheduler.cancel(*key),
        };

        match result {
            Ok(()) => tracing::debug!(
                patient_id = action.patient_id(),
                key = action.key(),
                action = ?action,
                "reminder dispatched"
            ),
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    patient_id = action.patient_id(),
                    key = action.key(),
                    "reminder dispatch failed: {e}"
                );
            }
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::{Reminder, SchedulingError};
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyScheduler {
        scheduled: Mutex<Vec<(u32, ReminderPayload)>>,
        cancelled: Mutex<Vec<u32>>,
        deny_schedule: bool,
    }

    impl ReminderScheduler for FlakyScheduler {
        fn schedule(
            &self,
            key: u32,
            _fire_at: DateTime<Utc>,
            payload: &ReminderPayload,
        ) -> Result<(), SchedulingError> {
            if self.deny_schedule {
                return Err(SchedulingError::PermissionDenied);
            }
            self.scheduled.lock().unwrap().push((key, payload.clone()));
            Ok(())
        }

        fn cancel(&self, key: u32) -> Result<(), SchedulingError> {
            self.cancelled.lock().unwrap().push(key);
            Ok(())
        }
    }

    fn actions() -> Vec<ReminderAction> {
        vec![
            ReminderAction::Schedule(Reminder {
                patient_id: "1".into(),
                patient_name: "Rocky".into(),
                key: 11,
                fire_at: Utc::now(),
            }),
            ReminderAction::cancel("2"),
        ]
    }

    #[test]
    fn test_dispatch_all() {
        let scheduler = FlakyScheduler::default();
        let failed = dispatch(&actions(), &scheduler, &ReminderConfig::default());

        assert_eq!(failed, 0);
        let scheduled = scheduler.scheduled.lock().unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].0, 11);
        assert_eq!(
            scheduled[0].1.body,
            "Your patient Rocky has a scheduled appointment."
        );
        assert_eq!(scheduled[0].1.channel_id, "vetpoint-appointments");
        assert_eq!(*scheduler.cancelled.lock().unwrap(), vec![crate::reminders::reminder_key("2")]);
    }

    #[test]
    fn test_failure_does_not_stop_later_actions() {
        let scheduler = FlakyScheduler {
            deny_schedule: true,
            ..Default::default()
        };
        let failed = dispatch(&actions(), &scheduler, &ReminderConfig::default());

        assert_eq!(failed, 1);
        assert!(scheduler.scheduled.lock().unwrap().is_empty());
        assert_eq!(scheduler.cancelled.lock().unwrap().len(), 1);
    }
}
