//! Rendering Adapter: renderer-agnostic frame plan.
//!
//! # Invariants
//! - A renderer never mutates `ProgramState`; frames are built from a shared borrow.
//! - Every frame runs the same pass sequence: clear, opaque, models,
//!   transparent, two skyboxes, blur ping-pong, composite, then the optional overlay.
//! - Exactly one diamond variant is in the model list.
//! - Transparent draws are ordered far to near from the camera.

mod frame;
mod renderer;

pub use frame::{
    BLUR_PASSES, BlurDirection, BlurSource, DrawItem, DrawKind, Frame, LIGHT_MARKER_SCALE, Pass,
    SkyboxLayer, blur_schedule, plan_frame, sort_back_to_front,
};
pub use renderer::{DebugTextRenderer, Renderer};
