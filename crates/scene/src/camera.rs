use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

const PITCH_LIMIT: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

/// Direction of a keyboard-driven camera step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle fly camera. Angles are stored in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 7.0))
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// View matrix with the translation stripped, for drawing skyboxes.
    pub fn rotation_only_view(&self) -> Mat4 {
        let view = self.view_matrix();
        Mat4::from_mat3(glam::Mat3::from_mat4(view))
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Offsets are in screen pixels; positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Restore a persisted orientation. `front` is kept bit-for-bit; right/up
    /// are rebuilt from it so later movement matches the restored view.
    pub fn restore_orientation(&mut self, front: Vec3, pitch: f32, yaw: f32) {
        self.pitch = pitch;
        self.yaw = yaw;
        self.front = if front.length_squared() > f32::EPSILON {
            front
        } else {
            Vec3::NEG_Z
        };
        self.rebuild_basis();
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.rebuild_basis();
    }

    fn rebuild_basis(&mut self) {
        // Looking straight along world-up keeps the previous right vector.
        self.right = self.front.cross(self.world_up).try_normalize().unwrap_or(self.right);
        self.up = self.right.cross(self.front).normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 7.0));
        assert!(approx(cam.front, Vec3::NEG_Z));
        assert!(approx(cam.right, Vec3::X));
        assert!(approx(cam.up, Vec3::Y));
    }

    #[test]
    fn keyboard_movement_scales_with_delta() {
        let mut cam = Camera::default();
        cam.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 4.5)));
        cam.process_keyboard(CameraMovement::Right, 0.4);
        assert!(approx(cam.position, Vec3::new(1.0, 0.0, 4.5)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(cam.pitch, 89.0);
        cam.process_mouse_movement(0.0, -100_000.0, true);
        assert_eq!(cam.pitch, -89.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse_scroll(100.0);
        assert_eq!(cam.zoom, 1.0);
        cam.process_mouse_scroll(-100.0);
        assert_eq!(cam.zoom, 45.0);
    }

    #[test]
    fn restore_orientation_rebuilds_basis() {
        let mut cam = Camera::default();
        cam.restore_orientation(Vec3::X, 0.0, 0.0);
        assert!(approx(cam.front, Vec3::X));
        assert!(approx(cam.right, Vec3::Z));
        assert!(approx(cam.up, Vec3::Y));
    }

    #[test]
    fn rotation_only_view_drops_translation() {
        let cam = Camera::new(Vec3::new(5.0, -3.0, 2.0));
        let view = cam.rotation_only_view();
        assert_eq!(view.w_axis, glam::Vec4::W);
    }
}
