//! Scene state for Diamond's Universe.
//!
//! # Invariants
//! - `ProgramState` is the only mutable scene state; it is passed by
//!   reference, never held in a global.
//! - Exactly one diamond variant is active, chosen by `DiamondColor`.
//! - Orbit transforms depend only on elapsed seconds since start.
//! - Light rigs are rebuilt per frame; nothing tracks dirtiness.

pub mod camera;
pub mod lighting;
pub mod manifest;
pub mod orbit;
pub mod state;

pub use camera::{Camera, CameraMovement};
pub use lighting::{
    Attenuation, DirectionalLight, LightRig, LightingProfile, POINT_LIGHT_COUNT, PointLight,
    SpotLight,
};
pub use manifest::{CUBEMAP_FACES, ManifestError, SceneManifest};
pub use orbit::{OrbitBody, default_orbits};
pub use state::{CUBE_HALF_EXTENT, ProgramState};
