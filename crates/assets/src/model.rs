use crate::AssetError;
use std::path::{Path, PathBuf};

/// Interleaved vertex as uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

/// Material parameters with texture paths already resolved next to the OBJ.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInfo {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub diffuse_texture: Option<PathBuf>,
    pub specular_texture: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ModelData {
    pub path: PathBuf,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialInfo>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Load an OBJ file as triangulated, single-indexed meshes.
///
/// A missing or broken MTL file is logged and the meshes load without
/// materials.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let materials = match materials {
        Ok(materials) => materials
            .into_iter()
            .map(|m| MaterialInfo {
                name: m.name,
                diffuse: m.diffuse.unwrap_or([0.8; 3]),
                specular: m.specular.unwrap_or([0.5; 3]),
                shininess: m.shininess.unwrap_or(32.0),
                diffuse_texture: m.diffuse_texture.map(|t| base.join(t)),
                specular_texture: m.specular_texture.map(|t| base.join(t)),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("materials for {} failed to load: {e}", path.display());
            Vec::new()
        }
    };

    let meshes: Vec<MeshData> = models.into_iter().map(convert_mesh).collect();
    let model = ModelData {
        path: path.to_path_buf(),
        meshes,
        materials,
    };
    tracing::debug!(
        "model {} loaded: {} mesh(es), {} vertices, {} triangles",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

fn convert_mesh(model: tobj::Model) -> MeshData {
    let mesh = model.mesh;
    let count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == count;

    let mut vertices: Vec<ModelVertex> = (0..count)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ],
            normal: if has_normals {
                [
                    mesh.normals[3 * i],
                    mesh.normals[3 * i + 1],
                    mesh.normals[3 * i + 2],
                ]
            } else {
                [0.0; 3]
            },
            uv: if has_uvs {
                [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
            } else {
                [0.0; 2]
            },
        })
        .collect();

    if !has_normals {
        accumulate_normals(&mut vertices, &mesh.indices);
    }

    MeshData {
        name: model.name,
        vertices,
        indices: mesh.indices,
        material: mesh.material_id,
    }
}

/// Area-weighted smooth normals for meshes that ship without them.
fn accumulate_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut sums = vec![[0.0f32; 3]; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (vertices[a].position, vertices[b].position, vertices[c].position);
        let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for &v in &[a, b, c] {
            for k in 0..3 {
                sums[v][k] += n[k];
            }
        }
    }
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        let len = (sum[0] * sum[0] + sum[1] * sum[1] + sum[2] * sum[2]).sqrt();
        if len > 0.0 {
            vertex.normal = [sum[0] / len, sum[1] / len, sum[2] / len];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
mtllib gem.mtl
o gem
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
usemtl crystal
f 1/1/1 2/2/1 3/3/1
";

    const GEM_MTL: &str = "\
newmtl crystal
Kd 0.1 0.8 0.9
Ks 1.0 1.0 1.0
Ns 64
map_Kd crystal_diffuse.png
";

    #[test]
    fn loads_triangle_with_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gem.obj"), TRIANGLE_OBJ).unwrap();
        std::fs::write(dir.path().join("gem.mtl"), GEM_MTL).unwrap();

        let model = load_model(dir.path().join("gem.obj")).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.material, Some(0));

        let material = &model.materials[0];
        assert_eq!(material.name, "crystal");
        assert_eq!(material.diffuse, [0.1, 0.8, 0.9]);
        assert_eq!(material.shininess, 64.0);
        assert_eq!(
            material.diffuse_texture,
            Some(dir.path().join("crystal_diffuse.png"))
        );
        assert_eq!(material.specular_texture, None);
    }

    #[test]
    fn missing_mtl_still_loads_geometry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gem.obj"), TRIANGLE_OBJ).unwrap();

        let model = load_model(dir.path().join("gem.obj")).unwrap();
        assert_eq!(model.triangle_count(), 1);
        assert!(model.materials.is_empty());
    }

    #[test]
    fn normals_are_generated_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("flat.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 0 -1\nf 1 2 3\n",
        )
        .unwrap();

        let model = load_model(dir.path().join("flat.obj")).unwrap();
        for v in &model.meshes[0].vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn missing_obj_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_model(dir.path().join("nope.obj")),
            Err(AssetError::Obj { .. })
        ));
    }
}
