//! Orbiting bodies.
//!
//! Positions are a direct function of seconds since start. They are not
//! integrated from frame deltas, so the same `t` always yields the same
//! transform regardless of frame rate.

use diamond_common::Transform;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One body on a sinusoidal orbit around the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitBody {
    pub name: String,
    /// OBJ path relative to the resource root.
    pub model: String,
    pub radius: f32,
    /// Angular speed in radians per second.
    pub angular_speed: f32,
    /// Starting phase in radians.
    #[serde(default)]
    pub phase: f32,
    /// Vertical bob amplitude.
    #[serde(default)]
    pub bob: f32,
    /// Self-rotation in radians per second.
    #[serde(default)]
    pub spin: f32,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

impl OrbitBody {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let angle = self.angular_speed * t + self.phase;
        Vec3::new(
            self.radius * angle.cos(),
            self.bob * angle.sin(),
            self.radius * angle.sin(),
        )
    }

    pub fn transform_at(&self, t: f32) -> Transform {
        Transform {
            position: self.position_at(t),
            rotation: Quat::from_rotation_y(self.spin * t),
            scale: Vec3::splat(self.scale),
        }
    }
}

pub fn default_orbits() -> Vec<OrbitBody> {
    vec![
        OrbitBody {
            name: "planet".into(),
            model: "objects/planet/planet.obj".into(),
            radius: 6.0,
            angular_speed: 0.5,
            phase: 0.0,
            bob: 0.5,
            spin: 0.3,
            scale: 0.6,
        },
        OrbitBody {
            name: "moon".into(),
            model: "objects/moon/moon.obj".into(),
            radius: 9.0,
            angular_speed: 0.3,
            phase: std::f32::consts::FRAC_PI_2,
            bob: 1.5,
            spin: 0.8,
            scale: 0.4,
        },
        OrbitBody {
            name: "rock".into(),
            model: "objects/rock/rock.obj".into(),
            radius: 12.0,
            angular_speed: -0.2,
            phase: std::f32::consts::PI,
            bob: -1.0,
            spin: 1.2,
            scale: 0.3,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_pure_function_of_time() {
        for body in default_orbits() {
            assert_eq!(body.position_at(12.345), body.position_at(12.345));
            assert_eq!(body.transform_at(3.0), body.transform_at(3.0));
        }
    }

    #[test]
    fn orbit_stays_on_radius() {
        let body = &default_orbits()[0];
        for t in [0.0, 1.0, 7.5, 100.0] {
            let p = body.position_at(t);
            let planar = Vec3::new(p.x, 0.0, p.z).length();
            assert!((planar - body.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn phase_offsets_start_position() {
        let body = &default_orbits()[1];
        let p = body.position_at(0.0);
        assert!(p.x.abs() < 1e-4);
        assert!((p.z - body.radius).abs() < 1e-4);
    }
}
