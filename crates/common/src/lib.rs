//! Shared types used across the scene, input, render and app crates.

mod types;

pub use types::{DiamondColor, Transform, Viewport};
