//! Bind group layouts and render pipelines for every program.

use crate::geometry;
use crate::shaders::{ShaderBundle, ShaderProgram};
use crate::targets::{DEPTH_FORMAT, HDR_FORMAT};
use crate::uniforms::ObjectUniforms;

/// Bind group layouts shared across programs.
pub struct Layouts {
    pub frame: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub lights: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    /// Diffuse map, sampler and specular map of a model material.
    pub material: wgpu::BindGroupLayout,
    pub cube: wgpu::BindGroupLayout,
    pub params: wgpu::BindGroupLayout,
}

fn uniform_entry(
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
    min_binding_size: Option<wgpu::BufferSize>,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size,
        },
        count: None,
    }
}

fn texture_entry(
    binding: u32,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn sampled_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[texture_entry(0, view_dimension), sampler_entry(1)],
    })
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_layout"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                false,
                None,
            )],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                true,
                wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
            )],
        });
        let lights = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lights_layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::FRAGMENT, false, None)],
        });
        let params = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("params_layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::FRAGMENT, false, None)],
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                sampler_entry(1),
                texture_entry(2, wgpu::TextureViewDimension::D2),
            ],
        });

        Self {
            frame,
            object,
            lights,
            texture: sampled_layout(device, "texture_layout", wgpu::TextureViewDimension::D2),
            material,
            cube: sampled_layout(device, "cube_layout", wgpu::TextureViewDimension::Cube),
            params,
        }
    }
}

/// Fixed-function state of one scene pipeline.
struct SceneState {
    blend: wgpu::BlendState,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

impl SceneState {
    const OPAQUE: Self = Self {
        blend: wgpu::BlendState::REPLACE,
        depth_write: true,
        depth_compare: wgpu::CompareFunction::Less,
    };
    const TRANSLUCENT: Self = Self {
        blend: wgpu::BlendState::ALPHA_BLENDING,
        depth_write: true,
        depth_compare: wgpu::CompareFunction::Less,
    };
}

const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

#[allow(clippy::too_many_arguments)]
fn create_scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    vs_entry: &str,
    fs_entry: &str,
    layouts: &[&wgpu::BindGroupLayout],
    vertex: wgpu::VertexBufferLayout<'_>,
    state: SceneState,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    let target = Some(wgpu::ColorTargetState {
        format: HDR_FORMAT,
        blend: Some(state.blend),
        write_mask: wgpu::ColorWrites::ALL,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            compilation_options: Default::default(),
            buffers: &[vertex],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[target.clone(), target],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write,
            depth_compare: state.depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    fs_entry: &str,
    layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// Every pipeline the frame executor binds.
pub struct Pipelines {
    pub cube: wgpu::RenderPipeline,
    pub marker: wgpu::RenderPipeline,
    pub diamond: wgpu::RenderPipeline,
    pub planet: wgpu::RenderPipeline,
    pub window: wgpu::RenderPipeline,
    pub skybox_sunset: wgpu::RenderPipeline,
    pub skybox_universe: wgpu::RenderPipeline,
    pub blur: wgpu::RenderPipeline,
    pub composite: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderBundle,
        layouts: &Layouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let cube = create_scene_pipeline(
            device,
            "cube_pipeline",
            shaders.get(ShaderProgram::Cube),
            "vs_cube",
            "fs_cube",
            &[&layouts.frame, &layouts.object, &layouts.cube],
            geometry::pos_normal_layout(),
            SceneState::OPAQUE,
        );
        let marker = create_scene_pipeline(
            device,
            "marker_pipeline",
            shaders.get(ShaderProgram::Hdr),
            "vs_marker",
            "fs_marker",
            &[&layouts.frame, &layouts.object],
            geometry::pos_normal_layout(),
            SceneState::OPAQUE,
        );
        let diamond = create_scene_pipeline(
            device,
            "diamond_pipeline",
            shaders.get(ShaderProgram::Diamond),
            "vs_mesh",
            "fs_diamond",
            &[
                &layouts.frame,
                &layouts.object,
                &layouts.lights,
                &layouts.cube,
            ],
            geometry::mesh_layout(),
            SceneState::TRANSLUCENT,
        );
        let planet = create_scene_pipeline(
            device,
            "planet_pipeline",
            shaders.get(ShaderProgram::Planet),
            "vs_mesh",
            "fs_planet",
            &[
                &layouts.frame,
                &layouts.object,
                &layouts.lights,
                &layouts.material,
            ],
            geometry::mesh_layout(),
            SceneState::OPAQUE,
        );
        let window = create_scene_pipeline(
            device,
            "window_pipeline",
            shaders.get(ShaderProgram::Window),
            "vs_window",
            "fs_window",
            &[&layouts.frame, &layouts.object, &layouts.texture],
            geometry::pos_uv_layout(),
            SceneState::TRANSLUCENT,
        );

        let skybox = shaders.get(ShaderProgram::Skybox);
        let sky_layouts = [&layouts.frame, &layouts.cube];
        let skybox_sunset = create_scene_pipeline(
            device,
            "skybox_sunset_pipeline",
            skybox,
            "vs_skybox",
            "fs_skybox",
            &sky_layouts,
            geometry::pos_layout(),
            SceneState {
                blend: wgpu::BlendState::REPLACE,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );
        let skybox_universe = create_scene_pipeline(
            device,
            "skybox_universe_pipeline",
            skybox,
            "vs_skybox",
            "fs_skybox",
            &sky_layouts,
            geometry::pos_layout(),
            SceneState {
                blend: ADDITIVE,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );

        let blur = create_fullscreen_pipeline(
            device,
            "blur_pipeline",
            shaders.get(ShaderProgram::Blur),
            "fs_blur",
            &[&layouts.params, &layouts.texture],
            HDR_FORMAT,
        );
        let composite = create_fullscreen_pipeline(
            device,
            "composite_pipeline",
            shaders.get(ShaderProgram::Bloom),
            "fs_composite",
            &[&layouts.params, &layouts.texture, &layouts.texture],
            surface_format,
        );

        Self {
            cube,
            marker,
            diamond,
            planet,
            window,
            skybox_sunset,
            skybox_universe,
            blur,
            composite,
        }
    }
}
