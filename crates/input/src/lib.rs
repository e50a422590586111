//! Input handling: raw key and cursor events in, scene actions out.
//!
//! # Invariants
//! - Polled actions come from the held-key set once per frame.
//! - Panel and lighting toggles fire on the press edge only; key repeat is ignored.
//! - Bloom toggles once per press however long Space is held.
//! - The first cursor sample after a (re)capture never rotates the camera.

pub mod action;
pub mod key;
pub mod mouse;
pub mod state;

pub use action::{Action, EXPOSURE_RATE};
pub use key::Key;
pub use mouse::MouseLook;
pub use state::{Debounce, InputState};
