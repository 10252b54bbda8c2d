//! Core configuration.
//!
//! Loaded from JSON supplied by the host app. Every field has a default, so
//! `{}` is a valid configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Notification channel used on Android for appointment reminders.
pub const DEFAULT_CHANNEL_ID: &str = "vetpoint-appointments";

/// Placeholder replaced with the patient name in reminder bodies.
pub const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub reminders: ReminderConfig,
}

/// How appointment reminders are presented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReminderConfig {
    pub channel_id: String,
    pub title: String,
    /// Body text; `{name}` is replaced with the patient name
    pub body_template: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            title: "Appointment Reminder".to_string(),
            body_template: "Your patient {name} has a scheduled appointment.".to_string(),
        }
    }
}

impl ReminderConfig {
    pub fn render_body(&self, patient_name: &str) -> String {
        self.body_template.replace(NAME_PLACEHOLDER, patient_name)
    }
}

impl CoreConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parsing config {}", path.display()))
    }
}
