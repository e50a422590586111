//! GPU copies of everything loaded from the resource root.
//!
//! Load failures are logged and leave the slot empty; the frame executor
//! skips draws whose resources are missing.

use crate::geometry::MeshVertex;
use crate::targets::texture_bind_group;
use crate::textures::{self, GpuTexture};
use diamond_assets::{MaterialInfo, ModelData, ResourceRoot, load_cubemap, load_model, load_texture};
use diamond_common::DiamondColor;
use diamond_scene::SceneManifest;
use std::collections::HashMap;
use std::path::Path;
use wgpu::util::DeviceExt;

const DEFAULT_SHININESS: f32 = 32.0;

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub material: Option<usize>,
}

pub struct GpuMaterial {
    pub tint: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// Diffuse and specular maps. `None` when a map the material names
    /// failed to load.
    pub maps: Option<wgpu::BindGroup>,
    pub single_channel: bool,
}

pub struct GpuModel {
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<GpuMaterial>,
    /// Bound for meshes without a material.
    pub fallback: GpuMaterial,
}

impl GpuModel {
    pub fn material(&self, mesh: &GpuMesh) -> &GpuMaterial {
        mesh.material
            .and_then(|i| self.materials.get(i))
            .unwrap_or(&self.fallback)
    }
}

/// Pair up a material's diffuse and specular maps. The outer option says
/// whether the material names the map, the inner one whether it loaded. A
/// named map that failed leaves the material without maps; an unnamed map
/// comes back as `None` and is bound as the white texture.
fn resolve_maps<T>(
    diffuse: Option<Option<T>>,
    specular: Option<Option<T>>,
) -> Option<(Option<T>, Option<T>)> {
    match (diffuse, specular) {
        (Some(None), _) | (_, Some(None)) => None,
        (diffuse, specular) => Some((diffuse.flatten(), specular.flatten())),
    }
}

/// Shared objects needed while uploading textures.
pub struct UploadContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub texture_layout: &'a wgpu::BindGroupLayout,
    pub material_layout: &'a wgpu::BindGroupLayout,
    pub cube_layout: &'a wgpu::BindGroupLayout,
    /// Clamped sampler for cubemaps and the window texture.
    pub sampler: &'a wgpu::Sampler,
    /// Repeating sampler for model textures.
    pub model_sampler: &'a wgpu::Sampler,
    pub white: &'a GpuTexture,
}

impl UploadContext<'_> {
    fn bind(&self, texture: &GpuTexture, sampler: &wgpu::Sampler, label: &str) -> wgpu::BindGroup {
        texture_bind_group(self.device, self.texture_layout, &texture.view, sampler, label)
    }

    fn upload_map(&self, path: &Path, label: &str) -> Option<GpuTexture> {
        let data = load_texture(path)?;
        textures::upload_texture(self.device, self.queue, &data, label)
    }

    fn bind_maps(
        &self,
        diffuse: &GpuTexture,
        specular: &GpuTexture,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.model_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
            ],
        })
    }

    fn upload_material(&self, material: &MaterialInfo) -> GpuMaterial {
        let label = material.name.as_str();
        let diffuse = material
            .diffuse_texture
            .as_deref()
            .map(|path| self.upload_map(path, label));
        let specular = material
            .specular_texture
            .as_deref()
            .map(|path| self.upload_map(path, label));
        let single_channel = matches!(&diffuse, Some(Some(texture)) if texture.single_channel);

        let maps = resolve_maps(diffuse, specular).map(|(diffuse, specular)| {
            self.bind_maps(
                diffuse.as_ref().unwrap_or(self.white),
                specular.as_ref().unwrap_or(self.white),
                label,
            )
        });

        GpuMaterial {
            tint: material.diffuse,
            specular: material.specular,
            shininess: if material.shininess > 0.0 {
                material.shininess
            } else {
                DEFAULT_SHININESS
            },
            maps,
            single_channel,
        }
    }

    fn upload_model(&self, data: &ModelData, label: &str) -> GpuModel {
        let device = self.device;
        let meshes = data
            .meshes
            .iter()
            .map(|mesh| {
                let vertices: Vec<MeshVertex> =
                    mesh.vertices.iter().map(MeshVertex::from).collect();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    material: mesh.material,
                }
            })
            .collect();

        let materials = data
            .materials
            .iter()
            .map(|material| self.upload_material(material))
            .collect();

        GpuModel {
            meshes,
            materials,
            fallback: GpuMaterial {
                tint: [1.0; 3],
                specular: [1.0; 3],
                shininess: DEFAULT_SHININESS,
                maps: Some(self.bind_maps(self.white, self.white, "white")),
                single_channel: false,
            },
        }
    }

    fn load_model(&self, root: &ResourceRoot, relative: &str) -> Option<GpuModel> {
        match load_model(root.resolve(relative)) {
            Ok(data) => {
                tracing::info!(
                    "loaded model {relative}: {} vertices, {} triangles",
                    data.vertex_count(),
                    data.triangle_count()
                );
                Some(self.upload_model(&data, relative))
            }
            Err(e) => {
                tracing::error!("model skipped: {e}");
                None
            }
        }
    }

    fn load_skybox(
        &self,
        root: &ResourceRoot,
        faces: &[String; 6],
        label: &str,
    ) -> wgpu::BindGroup {
        let data = load_cubemap(root.resolve_all(faces));
        if !data.is_complete() {
            tracing::warn!("cubemap {label} missing faces {:?}", data.missing());
        }
        let view = textures::upload_cubemap(self.device, self.queue, &data, label);
        texture_bind_group(self.device, self.cube_layout, &view, self.sampler, label)
    }
}

/// Textures and models for the scene.
pub struct SceneResources {
    pub sunset: wgpu::BindGroup,
    pub universe: wgpu::BindGroup,
    pub window: Option<wgpu::BindGroup>,
    pub diamonds: HashMap<DiamondColor, GpuModel>,
    /// Parallel to the manifest's orbit table.
    pub planets: Vec<Option<GpuModel>>,
}

impl SceneResources {
    pub fn load(ctx: &UploadContext<'_>, root: &ResourceRoot, manifest: &SceneManifest) -> Self {
        let sunset = ctx.load_skybox(root, &manifest.sunset_faces(), "sunset_skybox");
        let universe = ctx.load_skybox(root, &manifest.universe_faces(), "universe_skybox");

        let window = load_texture(root.resolve(&manifest.window_texture))
            .and_then(|data| {
                textures::upload_texture(ctx.device, ctx.queue, &data, "window_texture")
            })
            .map(|gpu| ctx.bind(&gpu, ctx.sampler, "window_texture"));

        let diamonds = DiamondColor::ALL
            .iter()
            .filter_map(|color| {
                ctx.load_model(root, &color.model_path())
                    .map(|model| (*color, model))
            })
            .collect();

        let planets = manifest
            .orbits
            .iter()
            .map(|body| ctx.load_model(root, &body.model))
            .collect();

        Self {
            sunset,
            universe,
            window,
            diamonds,
            planets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_maps_fall_back_to_white() {
        assert_eq!(resolve_maps::<u8>(None, None), Some((None, None)));
        assert_eq!(resolve_maps(Some(Some(1)), None), Some((Some(1), None)));
    }

    #[test]
    fn loaded_specular_map_is_bound_alongside_diffuse() {
        assert_eq!(
            resolve_maps(Some(Some("diffuse")), Some(Some("specular"))),
            Some((Some("diffuse"), Some("specular")))
        );
        assert_eq!(resolve_maps(None, Some(Some(2))), Some((None, Some(2))));
    }

    #[test]
    fn a_failed_named_map_drops_the_material() {
        assert_eq!(resolve_maps(Some(None), Some(Some(2))), None);
        assert_eq!(resolve_maps(Some(Some(1)), Some(None)), None);
        assert_eq!(resolve_maps::<u8>(None, Some(None)), None);
    }
}
