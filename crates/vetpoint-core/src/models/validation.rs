//! Patient form validation.
//!
//! The roster store accepts whatever it is given; these are the rules the
//! patient form applies before calling it.

use std::sync::OnceLock;

use regex::Regex;

use super::patient::{NewPatient, PatientPatch};

/// A single failing form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// All failing fields of a form submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe(.fields))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("static regex"))
}

#[derive(Default)]
struct Checker {
    fields: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.fields.push(FieldError { field, message });
    }

    fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    fn email(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.push("owner_email", "is required");
        } else if !email_regex().is_match(value) {
            self.push("owner_email", "is not a valid email address");
        }
    }

    fn phone(&mut self, value: Option<&str>) {
        let Some(phone) = value.filter(|p| !p.trim().is_empty()) else {
            return;
        };
        let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        if !phone_regex().is_match(&digits) {
            self.push("owner_phone", "must have 10 digits");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                fields: self.fields,
            })
        }
    }
}

impl NewPatient {
    /// Validate form input.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("name", &self.name);
        check.required("species", &self.species);
        check.required("owner_name", &self.owner_name);
        check.email(&self.owner_email);
        check.phone(self.owner_phone.as_deref());
        check.required("symptoms", &self.symptoms);
        check.finish()
    }
}

impl PatientPatch {
    /// Validate only the fields the patch sets.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        if let Some(name) = &self.name {
            check.required("name", name);
        }
        if let Some(species) = &self.species {
            check.required("species", species);
        }
        if let Some(owner_name) = &self.owner_name {
            check.required("owner_name", owner_name);
        }
        if let Some(email) = &self.owner_email {
            check.email(email);
        }
        if let Some(phone) = &self.owner_phone {
            check.phone(phone.as_deref());
        }
        if let Some(symptoms) = &self.symptoms {
            check.required("symptoms", symptoms);
        }
        check.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewPatient {
        NewPatient {
            name: "Misha".into(),
            species: "feline".into(),
            owner_name: "Sofia Torres".into(),
            owner_email: "sofia@example.com".into(),
            owner_phone: Some("555 123 4567".into()),
            symptoms: "Increased thirst".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_blank_required_fields() {
        let input = NewPatient {
            name: "   ".into(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("species"));
        assert!(errors.contains("owner_name"));
        assert!(errors.contains("owner_email"));
        assert!(errors.contains("symptoms"));
        assert!(!errors.contains("owner_phone"));
    }

    #[test]
    fn test_bad_email() {
        let mut input = valid_input();
        input.owner_email = "sofia@example".into();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.fields.len(), 1);
        assert_eq!(errors.fields[0].field, "owner_email");
    }

    #[test]
    fn test_bad_phone() {
        let mut input = valid_input();
        input.owner_phone = Some("12345".into());
        assert!(input.validate().unwrap_err().contains("owner_phone"));

        input.owner_phone = Some("".into());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_patch_checks_only_set_fields() {
        let patch = PatientPatch {
            notes: Some(Some("Follow up".into())),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let patch = PatientPatch {
            symptoms: Some(" ".into()),
            ..Default::default()
        };
        assert!(patch.validate().unwrap_err().contains("symptoms"));
    }

    #[test]
    fn test_display_lists_fields() {
        let mut input = valid_input();
        input.name = String::new();
        let message = input.validate().unwrap_err().to_string();
        assert_eq!(message, "name: is required");
    }

    #[test]
    fn test_phone_requires_ascii_digits() {
        let mut input = valid_input();
        input.owner_phone = Some("٠١٢٣٤٥٦٧٨٩".into());
        assert!(input.validate().unwrap_err().contains("owner_phone"));

        input.owner_phone = Some("555 123 4567".into());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_usable_as_std_error() {
        let mut input = valid_input();
        input.symptoms = String::new();
        input.owner_email = "nope".into();
        let err: Box<dyn std::error::Error> = Box::new(input.validate().unwrap_err());
        assert_eq!(
            err.to_string(),
            "owner_email: is not a valid email address; symptoms: is required"
        );
    }
}
