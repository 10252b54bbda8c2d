//! Roster store: the authoritative in-memory patient list for the signed-in
//! clinic user, and the only consumer of the persistence collaborator.

mod repository;
mod store;

pub use repository::*;
pub use store::*;

use thiserror::Error;

/// Roster store errors.
///
/// Every error leaves the in-memory roster and selection unchanged.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("No clinic user is signed in")]
    NotSignedIn,

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

pub type RosterResult<T> = Result<T, RosterError>;
