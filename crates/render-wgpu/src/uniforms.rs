//! Uniform layouts shared with the WGSL in `shaders`. Every member is a
//! 16-byte vector or a matrix so the Rust and WGSL layouts match.

use bytemuck::{Pod, Zeroable};
use diamond_render::Frame;
use diamond_scene::{Attenuation, LightRig, POINT_LIGHT_COUNT};
use glam::{Mat4, Vec3};

/// Dynamic-offset stride for per-draw uniforms.
pub const OBJECT_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub sky_view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl FrameUniforms {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            sky_view: frame.sky_view.to_cols_array_2d(),
            camera_position: frame.camera_position.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb tint, a = opacity.
    pub color: [f32; 4],
    /// x = shininess, y = 1 when the bound texture has a single channel.
    pub params: [f32; 4],
    /// Material specular colour, scaled per texel by the specular map.
    pub specular: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4, color: [f32; 4], shininess: f32, single_channel: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color,
            params: [shininess, if single_channel { 1.0 } else { 0.0 }, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0, 0.0],
        }
    }

    pub fn with_specular(mut self, [r, g, b]: [f32; 3]) -> Self {
        self.specular = [r, g, b, 0.0];
        self
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GpuSpotLight {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
    /// x = cos(inner cut-off), y = cos(outer cut-off).
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct LightsUniform {
    pub points: [GpuPointLight; POINT_LIGHT_COUNT],
    pub directional: GpuDirectionalLight,
    pub spot: GpuSpotLight,
}

fn v4(v: Vec3) -> [f32; 4] {
    v.extend(0.0).to_array()
}

fn att(a: &Attenuation) -> [f32; 4] {
    [a.constant, a.linear, a.quadratic, 0.0]
}

impl From<&LightRig> for LightsUniform {
    fn from(rig: &LightRig) -> Self {
        Self {
            points: rig.points.map(|p| GpuPointLight {
                position: v4(p.position),
                ambient: v4(p.ambient),
                diffuse: v4(p.diffuse),
                specular: v4(p.specular),
                attenuation: att(&p.attenuation),
            }),
            directional: GpuDirectionalLight {
                direction: v4(rig.directional.direction),
                ambient: v4(rig.directional.ambient),
                diffuse: v4(rig.directional.diffuse),
                specular: v4(rig.directional.specular),
            },
            spot: GpuSpotLight {
                position: v4(rig.spot.position),
                direction: v4(rig.spot.direction),
                ambient: v4(rig.spot.ambient),
                diffuse: v4(rig.spot.diffuse),
                specular: v4(rig.spot.specular),
                attenuation: att(&rig.spot.attenuation),
                cone: [
                    rig.spot.cut_off.to_radians().cos(),
                    rig.spot.outer_cut_off.to_radians().cos(),
                    0.0,
                    0.0,
                ],
            },
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct BlurParams {
    pub horizontal: u32,
    pub _pad: [u32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CompositeParams {
    pub bloom: u32,
    pub exposure: f32,
    pub _pad: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_scene::{Camera, LightingProfile};
    use std::mem::size_of;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        for size in [
            size_of::<FrameUniforms>(),
            size_of::<ObjectUniforms>(),
            size_of::<LightsUniform>(),
            size_of::<BlurParams>(),
            size_of::<CompositeParams>(),
        ] {
            assert_eq!(size % 16, 0, "size {size}");
        }
        assert!(size_of::<ObjectUniforms>() as u64 <= OBJECT_STRIDE);
        assert_eq!(size_of::<LightsUniform>(), 4 * 80 + 64 + 112);
    }

    #[test]
    fn spot_cone_is_stored_as_cosines() {
        let rig = LightingProfile::Diamond.rig(&Camera::default(), true);
        let gpu = LightsUniform::from(&rig);
        assert!((gpu.spot.cone[0] - 12.5_f32.to_radians().cos()).abs() < 1e-6);
        assert!(gpu.spot.cone[0] > gpu.spot.cone[1]);
    }

    #[test]
    fn normal_matrix_of_uniform_scale_keeps_direction() {
        let object = ObjectUniforms::new(Mat4::from_scale(Vec3::splat(2.0)), [1.0; 4], 32.0, true);
        assert_eq!(object.normal_matrix[0][0], 0.5);
        assert_eq!(object.params[1], 1.0);
        assert_eq!(object.specular, [1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn material_specular_reaches_the_object_block() {
        let object = ObjectUniforms::new(Mat4::IDENTITY, [1.0; 4], 16.0, false)
            .with_specular([0.5, 0.25, 0.0]);
        assert_eq!(object.specular, [0.5, 0.25, 0.0, 0.0]);
        assert_eq!(size_of::<ObjectUniforms>(), 176);
    }
}
