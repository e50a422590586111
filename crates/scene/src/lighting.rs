//! Light descriptors and the two upload profiles.
//!
//! The rig is rebuilt every frame from a profile, the camera, and the bling
//! flag. Nothing here caches effective values, so toggling bling off and on
//! always yields the profile's original diffuse/specular channels.

use crate::camera::Camera;
use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const POINT_LIGHT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    /// Inner cone angle in degrees.
    pub cut_off: f32,
    /// Outer cone angle in degrees.
    pub outer_cut_off: f32,
}

/// Everything a lit program needs for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub points: [PointLight; POINT_LIGHT_COUNT],
    pub directional: DirectionalLight,
    pub spot: SpotLight,
}

impl LightRig {
    /// Zero every diffuse and specular channel, leaving ambient terms.
    pub fn darkened(mut self) -> Self {
        for point in &mut self.points {
            point.diffuse = Vec3::ZERO;
            point.specular = Vec3::ZERO;
        }
        self.directional.diffuse = Vec3::ZERO;
        self.directional.specular = Vec3::ZERO;
        self.spot.diffuse = Vec3::ZERO;
        self.spot.specular = Vec3::ZERO;
        self
    }
}

pub const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(2.5, 2.0, 2.5),
    Vec3::new(-2.5, 2.0, -2.5),
    Vec3::new(2.5, -2.0, -2.5),
    Vec3::new(-2.5, -2.0, 2.5),
];

/// Which object family the rig is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingProfile {
    /// Strong specular highlights for the central gem.
    Diamond,
    /// Softer, diffuse-heavy light for the orbiting bodies.
    Planet,
}

impl LightingProfile {
    /// Build the rig for this profile with the spotlight locked to `camera`.
    pub fn rig(self, camera: &Camera, bling: bool) -> LightRig {
        let (ambient, diffuse, specular) = match self {
            LightingProfile::Diamond => (0.05, 0.8, 1.0),
            LightingProfile::Planet => (0.1, 0.6, 0.3),
        };

        let points = POINT_LIGHT_POSITIONS.map(|position| PointLight {
            position,
            ambient: Vec3::splat(ambient),
            diffuse: Vec3::splat(diffuse),
            specular: Vec3::splat(specular),
            attenuation: Attenuation::default(),
        });

        let directional = DirectionalLight {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::splat(ambient),
            diffuse: Vec3::splat(diffuse * 0.5),
            specular: Vec3::splat(specular * 0.5),
        };

        let spot = SpotLight {
            position: camera.position,
            direction: camera.front,
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
            cut_off: 12.5,
            outer_cut_off: 15.0,
        };

        let rig = LightRig {
            points,
            directional,
            spot,
        };
        if bling { rig } else { rig.darkened() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_follows_camera() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        let rig = LightingProfile::Planet.rig(&camera, true);
        assert_eq!(rig.spot.position, camera.position);
        assert_eq!(rig.spot.direction, camera.front);
    }

    #[test]
    fn darkened_keeps_ambient() {
        let camera = Camera::default();
        let lit = LightingProfile::Diamond.rig(&camera, true);
        let dark = LightingProfile::Diamond.rig(&camera, false);
        for (l, d) in lit.points.iter().zip(dark.points.iter()) {
            assert_eq!(l.ambient, d.ambient);
            assert_eq!(d.diffuse, Vec3::ZERO);
            assert_eq!(d.specular, Vec3::ZERO);
        }
        assert_eq!(dark.directional.diffuse, Vec3::ZERO);
        assert_eq!(dark.spot.specular, Vec3::ZERO);
    }

    #[test]
    fn profiles_differ() {
        let camera = Camera::default();
        let diamond = LightingProfile::Diamond.rig(&camera, true);
        let planet = LightingProfile::Planet.rig(&camera, true);
        assert_ne!(diamond.points[0].specular, planet.points[0].specular);
    }
}
