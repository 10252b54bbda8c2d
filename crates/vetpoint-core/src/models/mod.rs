//! Domain models for the VetPoint system.

mod patient;
mod user;
mod validation;

pub use patient::*;
pub use user::*;
pub use validation::*;
