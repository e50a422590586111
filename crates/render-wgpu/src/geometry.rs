use bytemuck::{Pod, Zeroable};
use diamond_assets::ModelVertex;
use diamond_scene::CUBE_HALF_EXTENT;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PosNormal {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PosUv {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl From<&ModelVertex> for MeshVertex {
    fn from(v: &ModelVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

pub const POS_NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
pub const POS_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
pub const POS_UV_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
pub const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

pub fn pos_normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PosNormal>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POS_NORMAL_ATTRIBUTES,
    }
}

pub fn pos_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POS_ATTRIBUTES,
    }
}

pub fn pos_uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PosUv>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POS_UV_ATTRIBUTES,
    }
}

pub fn mesh_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_ATTRIBUTES,
    }
}

/// (normal, u axis, v axis) per face; u x v points along the normal.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Corner signs for two counter-clockwise triangles.
const QUAD: [(f32, f32); 6] = [
    (-1.0, -1.0),
    (1.0, -1.0),
    (1.0, 1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

/// Non-indexed cube with per-face normals, 36 vertices.
pub fn cube_vertices(half: f32) -> Vec<PosNormal> {
    let mut verts = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        for (su, sv) in QUAD {
            let position = std::array::from_fn(|k| (n[k] + u[k] * su + v[k] * sv) * half);
            verts.push(PosNormal {
                position,
                normal: n,
            });
        }
    }
    verts
}

/// The reflective cube at the scene origin.
pub fn reflective_cube() -> Vec<PosNormal> {
    cube_vertices(CUBE_HALF_EXTENT)
}

/// Skybox positions double as cubemap lookup directions.
pub fn skybox_vertices() -> Vec<[f32; 3]> {
    cube_vertices(2.0).into_iter().map(|v| v.position).collect()
}

/// Unit window quad standing on its left edge, uv origin top-left.
#[rustfmt::skip]
pub fn window_quad() -> [PosUv; 6] {
    [
        PosUv { position: [0.0,  0.5, 0.0], uv: [0.0, 0.0] },
        PosUv { position: [0.0, -0.5, 0.0], uv: [0.0, 1.0] },
        PosUv { position: [1.0, -0.5, 0.0], uv: [1.0, 1.0] },
        PosUv { position: [0.0,  0.5, 0.0], uv: [0.0, 0.0] },
        PosUv { position: [1.0, -0.5, 0.0], uv: [1.0, 1.0] },
        PosUv { position: [1.0,  0.5, 0.0], uv: [1.0, 0.0] },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn cube_has_36_vertices_on_its_faces() {
        let verts = reflective_cube();
        assert_eq!(verts.len(), 36);
        for v in &verts {
            let on_face = (0..3).any(|k| (v.position[k].abs() - CUBE_HALF_EXTENT).abs() < 1e-6);
            assert!(on_face);
            assert!(v.position.iter().all(|c| c.abs() <= CUBE_HALF_EXTENT + 1e-6));
        }
    }

    #[test]
    fn cube_triangles_wind_outward() {
        for tri in cube_vertices(1.0).chunks_exact(3) {
            let n = cross(
                sub(tri[1].position, tri[0].position),
                sub(tri[2].position, tri[0].position),
            );
            let dot: f32 = (0..3).map(|k| n[k] * tri[0].normal[k]).sum();
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn skybox_and_window_counts() {
        assert_eq!(skybox_vertices().len(), 36);
        assert_eq!(window_quad().len(), 6);
    }
}
