//! VetPoint Core Library
//!
//! Local-first patient roster for veterinary clinics, with appointment
//! reminders pushed to the platform notification scheduler.
//!
//! # Architecture
//!
//! ```text
//!   Shell (Swift / Kotlin)
//!          │  create / update / delete / sign in
//!          ▼
//!   ┌──────────────────────────┐        ┌──────────────┐
//!   │       RosterStore        │◄──────►│   SQLite     │
//!   │  snapshot: Arc<Vec<_>>   │ persist│  (Database)  │
//!   └────────────┬─────────────┘        └──────────────┘
//!                │ previous + current snapshot
//!                ▼
//!           reconcile ──► ReminderAction* ──► dispatch ──► ReminderSink
//!                                                        (platform scheduler)
//! ```
//!
//! The roster is the source of truth for the display. Reminders are a
//! best-effort side channel: scheduling failures are logged, never surfaced.
//!
//! # Modules
//!
//! - [`models`]: Patient record, creation input, patch, clinic user, form validation
//! - [`db`]: SQLite persistence scoped by clinic user
//! - [`roster`]: Roster store and its persistence collaborator
//! - [`view`]: Search, status filter, display ordering, statistics
//! - [`reminders`]: Snapshot reconciler and scheduler dispatch
//! - [`config`]: Reminder presentation settings
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod reminders;
pub mod roster;
pub mod view;

// Re-export commonly used types
pub use config::{CoreConfig, ReminderConfig};
pub use db::Database;
pub use models::{ClinicUser, Gender, NewPatient, Patient, PatientPatch, PatientStatus};
pub use reminders::{reminder_key, ReminderAction, ReminderScheduler};
pub use roster::{PatientRepository, RosterError, RosterStore};
pub use view::{filter_roster, PatientFilters, RosterStats, StatusFilter};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use reminders::{ReminderPayload, SchedulingError};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetpointError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No clinic user is signed in")]
    NotSignedIn,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<db::DbError> for VetpointError {
    fn from(e: db::DbError) -> Self {
        VetpointError::Persistence(e.to_string())
    }
}

impl From<roster::PersistenceError> for VetpointError {
    fn from(e: roster::PersistenceError) -> Self {
        VetpointError::Persistence(e.to_string())
    }
}

impl From<RosterError> for VetpointError {
    fn from(e: RosterError) -> Self {
        match e {
            RosterError::NotFound(id) => VetpointError::NotFound(id),
            RosterError::NotSignedIn => VetpointError::NotSignedIn,
            RosterError::Persistence(inner) => inner.into(),
        }
    }
}

impl From<models::ValidationErrors> for VetpointError {
    fn from(e: models::ValidationErrors) -> Self {
        VetpointError::Validation(e.to_string())
    }
}

impl From<models::UnknownVariant> for VetpointError {
    fn from(e: models::UnknownVariant) -> Self {
        VetpointError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for VetpointError {
    fn from(e: serde_json::Error) -> Self {
        VetpointError::Config(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetpointError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetpointError::Persistence(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Platform Reminder Scheduler
// =========================================================================

/// Errors a platform scheduler can report back.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ReminderSinkError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ReminderSinkError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        ReminderSinkError::Unavailable(e.reason)
    }
}

/// Platform notification scheduler, implemented by the shell.
///
/// `fire_at` is RFC 3339. Scheduling under a key with a pending reminder
/// must replace it.
#[uniffi::export(with_foreign)]
pub trait ReminderSink: Send + Sync {
    fn schedule(
        &self,
        key: u32,
        fire_at: String,
        channel_id: String,
        title: String,
        body: String,
    ) -> Result<(), ReminderSinkError>;

    fn cancel(&self, key: u32) -> Result<(), ReminderSinkError>;
}

/// Adapts a shell-provided sink to the core scheduler trait.
struct SinkScheduler {
    sink: Arc<dyn ReminderSink>,
}

impl From<ReminderSinkError> for SchedulingError {
    fn from(e: ReminderSinkError) -> Self {
        match e {
            ReminderSinkError::PermissionDenied => SchedulingError::PermissionDenied,
            ReminderSinkError::Unavailable(reason) => SchedulingError::Unavailable(reason),
        }
    }
}

impl ReminderScheduler for SinkScheduler {
    fn schedule(
        &self,
        key: u32,
        fire_at: DateTime<Utc>,
        payload: &ReminderPayload,
    ) -> Result<(), SchedulingError> {
        Ok(self.sink.schedule(
            key,
            fire_at.to_rfc3339(),
            payload.channel_id.clone(),
            payload.title.clone(),
            payload.body.clone(),
        )?)
    }

    fn cancel(&self, key: u32) -> Result<(), SchedulingError> {
        Ok(self.sink.cancel(key)?)
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

fn parse_config(config_json: Option<String>) -> Result<CoreConfig, VetpointError> {
    match config_json {
        Some(json) => Ok(CoreConfig::from_json(&json)?),
        None => Ok(CoreConfig::default()),
    }
}

fn build_core(
    db: Database,
    config: CoreConfig,
    reminders: Arc<dyn ReminderSink>,
) -> Result<Arc<VetpointCore>, VetpointError> {
    let scheduler = Arc::new(SinkScheduler { sink: reminders });
    Ok(Arc::new(VetpointCore {
        store: Mutex::new(
            RosterStore::new(db, scheduler, config.reminders).with_deferred_reminders(),
        ),
    }))
}

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_core(
    path: String,
    config_json: Option<String>,
    reminders: Arc<dyn ReminderSink>,
) -> Result<Arc<VetpointCore>, VetpointError> {
    let config = parse_config(config_json)?;
    let db = Database::open(&path)?;
    build_core(db, config, reminders)
}

/// Open or create a database, reading configuration from a JSON file.
#[uniffi::export]
pub fn open_core_with_config_file(
    path: String,
    config_path: String,
    reminders: Arc<dyn ReminderSink>,
) -> Result<Arc<VetpointCore>, VetpointError> {
    let config = CoreConfig::from_path(&config_path)
        .map_err(|e| VetpointError::Config(format!("{e:#}")))?;
    let db = Database::open(&path)?;
    build_core(db, config, reminders)
}

/// Create an in-memory core (for testing and previews).
#[uniffi::export]
pub fn open_core_in_memory(
    config_json: Option<String>,
    reminders: Arc<dyn ReminderSink>,
) -> Result<Arc<VetpointCore>, VetpointError> {
    let config = parse_config(config_json)?;
    let db = Database::open_in_memory()?;
    build_core(db, config, reminders)
}

/// Install the tracing subscriber. Safe to call more than once.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init_logging(filter.as_deref())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe roster wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VetpointCore {
    store: Mutex<RosterStore<Database>>,
}

impl VetpointCore {
    /// Run a roster mutation, then deliver its reminders after the lock is
    /// released so a sink may call back into the core.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut RosterStore<Database>) -> Result<T, VetpointError>,
    ) -> Result<T, VetpointError> {
        let (result, pending) = {
            let mut store = self.store.lock()?;
            let result = op(&mut store);
            (result, store.take_pending_reminders())
        };
        pending.dispatch();
        result
    }
}

#[uniffi::export]
impl VetpointCore {
    // =========================================================================
    // Session
    // =========================================================================

    /// Load the roster of a clinic user and schedule its reminders.
    pub fn sign_in(&self, user_id: String) -> Result<(), VetpointError> {
        self.mutate(|store| Ok(store.sign_in(&user_id)?))
    }

    /// Drop the roster and cancel its reminders.
    pub fn sign_out(&self) -> Result<(), VetpointError> {
        self.mutate(|store| {
            store.sign_out();
            Ok(())
        })
    }

    pub fn signed_in_user(&self) -> Result<Option<String>, VetpointError> {
        let store = self.store.lock()?;
        Ok(store.user_id().map(str::to_string))
    }

    /// Save a clinic user's profile.
    pub fn save_user_profile(&self, user: FfiClinicUser) -> Result<(), VetpointError> {
        let store = self.store.lock()?;
        let user = ClinicUser::try_from(user)?;
        store.repository().upsert_user(&user)?;
        Ok(())
    }

    pub fn get_user_profile(&self, id: String) -> Result<Option<FfiClinicUser>, VetpointError> {
        let store = self.store.lock()?;
        let user = store.repository().get_user(&id)?;
        Ok(user.map(|u| u.into()))
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a patient after form validation.
    pub fn create_patient(&self, input: FfiNewPatient) -> Result<FfiPatient, VetpointError> {
        let input = NewPatient::try_from(input)?;
        input.validate()?;
        self.mutate(|store| Ok(store.create(input)?.into()))
    }

    /// Create several patients; nothing is kept if any fails.
    pub fn create_patients(
        &self,
        inputs: Vec<FfiNewPatient>,
    ) -> Result<Vec<FfiPatient>, VetpointError> {
        let inputs = inputs
            .into_iter()
            .map(|input| {
                let input = NewPatient::try_from(input)?;
                input.validate()?;
                Ok(input)
            })
            .collect::<Result<Vec<_>, VetpointError>>()?;
        self.mutate(|store| {
            let created = store.create_many(inputs)?;
            Ok(created.into_iter().map(|p| p.into()).collect())
        })
    }

    /// Merge a validated patch into a patient.
    pub fn update_patient(
        &self,
        id: String,
        patch: FfiPatientPatch,
    ) -> Result<FfiPatient, VetpointError> {
        let patch = PatientPatch::try_from(patch)?;
        patch.validate()?;
        self.mutate(|store| Ok(store.update(&id, patch)?.into()))
    }

    pub fn delete_patient(&self, id: String) -> Result<(), VetpointError> {
        self.mutate(|store| Ok(store.delete(&id)?))
    }

    /// Reload the roster from storage.
    pub fn refresh(&self) -> Result<(), VetpointError> {
        self.mutate(|store| Ok(store.refresh()?))
    }

    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, VetpointError> {
        let store = self.store.lock()?;
        Ok(store.get(&id).cloned().map(|p| p.into()))
    }

    pub fn add_photo(&self, id: String, uri: String) -> Result<FfiPatient, VetpointError> {
        self.mutate(|store| Ok(store.add_photo(&id, uri)?.into()))
    }

    pub fn remove_photo(&self, id: String, index: u32) -> Result<FfiPatient, VetpointError> {
        self.mutate(|store| Ok(store.remove_photo(&id, index as usize)?.into()))
    }

    /// Check form input without saving. Empty means valid.
    pub fn validate_patient(
        &self,
        input: FfiNewPatient,
    ) -> Result<Vec<FfiFieldError>, VetpointError> {
        let input = NewPatient::try_from(input)?;
        Ok(match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.fields.into_iter().map(|f| f.into()).collect(),
        })
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select_patient(&self, id: String) -> Result<FfiPatient, VetpointError> {
        let mut store = self.store.lock()?;
        Ok(store.select(&id)?.clone().into())
    }

    pub fn clear_selection(&self) -> Result<(), VetpointError> {
        let mut store = self.store.lock()?;
        store.clear_selection();
        Ok(())
    }

    pub fn selected_patient(&self) -> Result<Option<FfiPatient>, VetpointError> {
        let store = self.store.lock()?;
        Ok(store.selected().cloned().map(|p| p.into()))
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Patient list for display. `status` is `"all"` or a status string.
    pub fn list_patients(
        &self,
        search: String,
        status: String,
    ) -> Result<Vec<FfiPatient>, VetpointError> {
        let status: StatusFilter = status.parse()?;
        let store = self.store.lock()?;
        Ok(store
            .view(&search, status)
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    pub fn filter_patients(
        &self,
        filters: FfiPatientFilters,
    ) -> Result<Vec<FfiPatient>, VetpointError> {
        let filters = PatientFilters::try_from(filters)?;
        let store = self.store.lock()?;
        Ok(store
            .filter(&filters)
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    pub fn roster_stats(&self) -> Result<FfiRosterStats, VetpointError> {
        let store = self.store.lock()?;
        Ok(store.stats().into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, VetpointError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| VetpointError::InvalidInput(format!("{field}: {e}")))
}

fn parse_optional_time(
    field: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, VetpointError> {
    value.map(|v| parse_time(field, &v)).transpose()
}

fn parse_gender(value: Option<String>) -> Result<Option<Gender>, VetpointError> {
    Ok(value.map(|g| g.parse()).transpose()?)
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub symptoms: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub date_created: String,
    pub last_visit: Option<String>,
    pub next_appointment: Option<String>,
    pub photos: Vec<String>,
    pub status: String,
    pub is_emergency: bool,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            is_emergency: patient.is_emergency(),
            id: patient.id,
            name: patient.name,
            species: patient.species,
            breed: patient.breed,
            age: patient.age,
            gender: patient.gender.map(|g| g.as_str().to_string()),
            owner_name: patient.owner_name,
            owner_email: patient.owner_email,
            owner_phone: patient.owner_phone,
            symptoms: patient.symptoms,
            diagnosis: patient.diagnosis,
            treatment: patient.treatment,
            notes: patient.notes,
            date_created: patient.date_created.to_rfc3339(),
            last_visit: patient.last_visit.map(|t| t.to_rfc3339()),
            next_appointment: patient.next_appointment.map(|t| t.to_rfc3339()),
            photos: patient.photos,
            status: patient.status.as_str().to_string(),
        }
    }
}

/// FFI-safe creation input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub symptoms: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub next_appointment: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = VetpointError;

    fn try_from(input: FfiNewPatient) -> Result<Self, Self::Error> {
        Ok(NewPatient {
            gender: parse_gender(input.gender)?,
            next_appointment: parse_optional_time("next_appointment", input.next_appointment)?,
            status: input.status.map(|s| s.parse()).transpose()?,
            name: input.name,
            species: input.species,
            breed: input.breed,
            age: input.age,
            owner_name: input.owner_name,
            owner_email: input.owner_email,
            owner_phone: input.owner_phone,
            symptoms: input.symptoms,
            diagnosis: input.diagnosis,
            treatment: input.treatment,
            notes: input.notes,
        })
    }
}

/// FFI-safe patch.
///
/// `None` leaves a field untouched. Nullable fields named in `cleared` are
/// set to null.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub next_appointment: Option<String>,
    pub status: Option<String>,
    pub cleared: Vec<String>,
}

impl TryFrom<FfiPatientPatch> for PatientPatch {
    type Error = VetpointError;

    fn try_from(input: FfiPatientPatch) -> Result<Self, Self::Error> {
        let mut patch = PatientPatch {
            name: input.name,
            species: input.species,
            breed: input.breed.map(Some),
            age: input.age.map(Some),
            gender: parse_gender(input.gender)?.map(Some),
            owner_name: input.owner_name,
            owner_email: input.owner_email,
            owner_phone: input.owner_phone.map(Some),
            symptoms: input.symptoms,
            diagnosis: input.diagnosis.map(Some),
            treatment: input.treatment.map(Some),
            notes: input.notes.map(Some),
            next_appointment: parse_optional_time("next_appointment", input.next_appointment)?
                .map(Some),
            status: input.status.map(|s| s.parse()).transpose()?,
        };

        for field in &input.cleared {
            match field.as_str() {
                "breed" => patch.breed = Some(None),
                "age" => patch.age = Some(None),
                "gender" => patch.gender = Some(None),
                "owner_phone" => patch.owner_phone = Some(None),
                "diagnosis" => patch.diagnosis = Some(None),
                "treatment" => patch.treatment = Some(None),
                "notes" => patch.notes = Some(None),
                "next_appointment" => patch.next_appointment = Some(None),
                other => {
                    return Err(VetpointError::InvalidInput(format!(
                        "cannot clear field: {other}"
                    )))
                }
            }
        }

        Ok(patch)
    }
}

/// FFI-safe advanced filter.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientFilters {
    pub species: Option<String>,
    pub status: Option<String>,
    pub owner_name: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl TryFrom<FfiPatientFilters> for PatientFilters {
    type Error = VetpointError;

    fn try_from(input: FfiPatientFilters) -> Result<Self, Self::Error> {
        Ok(PatientFilters {
            species: input.species,
            status: input.status.map(|s| s.parse()).transpose()?,
            owner_name: input.owner_name,
            date_from: parse_optional_time("date_from", input.date_from)?,
            date_to: parse_optional_time("date_to", input.date_to)?,
        })
    }
}

/// FFI-safe roster statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRosterStats {
    pub total: u32,
    pub active: u32,
    pub in_treatment: u32,
    pub recovered: u32,
    pub emergency: u32,
    pub with_appointment: u32,
}

impl From<RosterStats> for FfiRosterStats {
    fn from(stats: RosterStats) -> Self {
        Self {
            total: stats.total as u32,
            active: stats.active as u32,
            in_treatment: stats.in_treatment as u32,
            recovered: stats.recovered as u32,
            emergency: stats.emergency as u32,
            with_appointment: stats.with_appointment as u32,
        }
    }
}

/// FFI-safe failing form field.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub message: String,
}

impl From<models::FieldError> for FfiFieldError {
    fn from(error: models::FieldError) -> Self {
        Self {
            field: error.field.to_string(),
            message: error.message.to_string(),
        }
    }
}

/// FFI-safe clinic user profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub clinic_name: String,
    pub license_number: String,
    pub specialty: Option<String>,
    pub phone_number: Option<String>,
    /// RFC 3339; `None` stamps the current time
    pub created_at: Option<String>,
}

impl From<ClinicUser> for FfiClinicUser {
    fn from(user: ClinicUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            clinic_name: user.clinic_name,
            license_number: user.license_number,
            specialty: user.specialty,
            phone_number: user.phone_number,
            created_at: Some(user.created_at.to_rfc3339()),
        }
    }
}

impl TryFrom<FfiClinicUser> for ClinicUser {
    type Error = VetpointError;

    fn try_from(user: FfiClinicUser) -> Result<Self, Self::Error> {
        Ok(ClinicUser {
            created_at: parse_optional_time("created_at", user.created_at)?
                .unwrap_or_else(Utc::now),
            id: user.id,
            name: user.name,
            email: user.email,
            clinic_name: user.clinic_name,
            license_number: user.license_number,
            specialty: user.specialty,
            phone_number: user.phone_number,
        })
    }
}
