//! Persistence collaborator for the roster store.

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::Patient;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Backing store for a clinic user's patients.
///
/// Every call is scoped by the signed-in user's id.
pub trait PatientRepository {
    /// Full roster snapshot, in insertion order.
    fn load_roster(&self, user_id: &str) -> PersistenceResult<Vec<Patient>>;

    fn add(&self, user_id: &str, patient: &Patient) -> PersistenceResult<()>;

    /// Overwrite a stored patient with the given record.
    fn update(&self, user_id: &str, patient: &Patient) -> PersistenceResult<()>;

    fn delete(&self, user_id: &str, id: &str) -> PersistenceResult<()>;
}

impl PatientRepository for Database {
    fn load_roster(&self, user_id: &str) -> PersistenceResult<Vec<Patient>> {
        Ok(self.list_patients(user_id)?)
    }

    fn add(&self, user_id: &str, patient: &Patient) -> PersistenceResult<()> {
        Ok(self.insert_patient(user_id, patient)?)
    }

    fn update(&self, user_id: &str, patient: &Patient) -> PersistenceResult<()> {
        if self.update_patient(user_id, patient)? {
            Ok(())
        } else {
            Err(DbError::NotFound(patient.id.clone()).into())
        }
    }

    fn delete(&self, user_id: &str, id: &str) -> PersistenceResult<()> {
        if self.delete_patient(user_id, id)? {
            Ok(())
        } else {
            Err(DbError::NotFound(id.to_string()).into())
        }
    }
}
