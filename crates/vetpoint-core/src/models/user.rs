//! Clinic staff profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of a signed-in clinic user. The roster is scoped by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicUser {
    /// Identity supplied by the auth provider
    pub id: String,
    pub name: String,
    pub email: String,
    pub clinic_name: String,
    /// Professional license number
    pub license_number: String,
    pub specialty: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClinicUser {
    pub fn new(id: String, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            clinic_name: String::new(),
            license_number: String::new(),
            specialty: None,
            phone_number: None,
            created_at: Utc::now(),
        }
    }
}
