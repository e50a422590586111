//! Persistence: one scalar per line, fixed order, no labels.
//!
//! # Invariants
//! - Field order is the schema; there is no version header.
//! - A missing file leaves defaults untouched.
//! - A short or malformed file keeps every field read before the failure.
//! - Floats are written in shortest round-trip form, so save then load
//!   reproduces values exactly.

mod state_file;

pub use state_file::{FIELD_COUNT, LoadOutcome, StateFile, StateFileError};
