//! wgpu backend for Diamond's Universe.
//!
//! Executes a planned `Frame`: scene geometry into a two-attachment HDR
//! target, skyboxes at the far plane, separable blur ping-pong over the
//! bright attachment, then exposure tone mapping onto the surface.
//!
//! # Invariants
//! - The renderer never sees `ProgramState`; it draws what the frame lists.
//! - Light uniforms for both profiles are written every frame.
//! - Size-dependent targets are recreated on resize; loaded resources are not.
//! - Draws whose model or texture failed to load are skipped.

mod context;
mod geometry;
mod gpu;
mod pipelines;
mod resources;
mod shaders;
mod targets;
mod textures;
mod uniforms;

pub use context::{GpuContext, RenderError};
pub use gpu::{GpuFrame, MAX_OBJECTS, WgpuRenderer};
pub use shaders::{ShaderBundle, ShaderProgram};
pub use targets::{DEPTH_FORMAT, HDR_FORMAT};
