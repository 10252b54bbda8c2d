//! Derived, display-ready views over a roster snapshot.
//!
//! Everything here is a pure function of its inputs.

mod filter;
mod stats;

pub use filter::*;
pub use stats::*;
