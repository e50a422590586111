use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Which diamond model variant is drawn. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiamondColor {
    #[default]
    Cyan,
    Pink,
}

impl DiamondColor {
    pub const ALL: [DiamondColor; 2] = [DiamondColor::Cyan, DiamondColor::Pink];

    pub fn name(self) -> &'static str {
        match self {
            DiamondColor::Cyan => "cyan",
            DiamondColor::Pink => "pink",
        }
    }

    /// Model path relative to the resource root.
    pub fn model_path(self) -> String {
        format!("objects/diamond_{}/diamond.obj", self.name())
    }
}

/// Framebuffer size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero height (minimised window) counts as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn diamond_model_paths_differ() {
        assert_eq!(
            DiamondColor::Cyan.model_path(),
            "objects/diamond_cyan/diamond.obj"
        );
        assert_eq!(
            DiamondColor::Pink.model_path(),
            "objects/diamond_pink/diamond.obj"
        );
    }

    #[test]
    fn viewport_aspect_handles_zero_height() {
        assert_eq!(Viewport::new(800, 600).aspect(), 800.0 / 600.0);
        assert_eq!(Viewport::new(10, 0).aspect(), 10.0);
    }
}
