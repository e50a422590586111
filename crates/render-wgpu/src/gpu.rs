use crate::geometry;
use crate::pipelines::{Layouts, Pipelines};
use crate::resources::{GpuMaterial, GpuModel, SceneResources, UploadContext};
use crate::shaders::ShaderBundle;
use crate::targets::SceneTargets;
use crate::textures;
use crate::uniforms::{
    BlurParams, CompositeParams, FrameUniforms, LightsUniform, OBJECT_STRIDE, ObjectUniforms,
};
use diamond_assets::ResourceRoot;
use diamond_common::Viewport;
use diamond_render::{
    BlurDirection, BlurSource, DrawItem, DrawKind, Frame, Pass, Renderer, SkyboxLayer,
};
use diamond_scene::{LightingProfile, SceneManifest};
use glam::Vec3;
use wgpu::util::DeviceExt;

/// Per-draw uniform slots available each frame.
pub const MAX_OBJECTS: usize = 256;

/// Light markers glow this many times brighter than their light's diffuse
/// colour so they land in the bright attachment.
const MARKER_INTENSITY: f32 = 5.0;

/// One recorded draw inside the scene pass.
struct DrawCall<'r> {
    pipeline: &'r wgpu::RenderPipeline,
    slot: u32,
    vertices: &'r wgpu::Buffer,
    indices: Option<(&'r wgpu::Buffer, u32)>,
    vertex_count: u32,
    /// Bound from group 2 upwards.
    groups: Vec<&'r wgpu::BindGroup>,
}

struct StaticMesh {
    buffer: wgpu::Buffer,
    count: u32,
}

impl StaticMesh {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, vertices: &[T]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn linear_sampler(device: &wgpu::Device, label: &str, mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: mode,
        address_mode_v: mode,
        address_mode_w: mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Which cubemap the reflective cube samples this frame.
fn cube_environment(frame: &Frame) -> SkyboxLayer {
    frame
        .opaque
        .iter()
        .find_map(|d| match d.kind {
            DrawKind::ReflectiveCube { environment } => Some(environment),
            _ => None,
        })
        .unwrap_or(SkyboxLayer::Sunset)
}

fn to_color(c: Vec3) -> wgpu::Color {
    wgpu::Color {
        r: c.x as f64,
        g: c.y as f64,
        b: c.z as f64,
        a: 1.0,
    }
}

/// wgpu backend: executes planned frames into an HDR target, blurs the
/// bright attachment and composites onto the surface.
pub struct WgpuRenderer {
    layouts: Layouts,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,
    targets: SceneTargets,
    resources: SceneResources,
    viewport: Viewport,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    diamond_lights_buffer: wgpu::Buffer,
    diamond_lights_bind_group: wgpu::BindGroup,
    planet_lights_buffer: wgpu::Buffer,
    planet_lights_bind_group: wgpu::BindGroup,
    composite_buffer: wgpu::Buffer,
    composite_bind_group: wgpu::BindGroup,
    /// Indexed by `horizontal as usize`.
    blur_bind_groups: [wgpu::BindGroup; 2],

    cube: StaticMesh,
    marker: StaticMesh,
    skybox: StaticMesh,
    window: StaticMesh,
}

impl WgpuRenderer {
    /// Compile programs, build pipelines and load every scene resource.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        root: &ResourceRoot,
        manifest: &SceneManifest,
    ) -> Self {
        let shaders = ShaderBundle::compile(device);
        let layouts = Layouts::new(device);
        let pipelines = Pipelines::new(device, &shaders, &layouts, surface_format);

        let sampler = linear_sampler(device, "clamp_sampler", wgpu::AddressMode::ClampToEdge);
        let model_sampler = linear_sampler(device, "repeat_sampler", wgpu::AddressMode::Repeat);
        let white = textures::white_texture(device, queue);

        let targets = SceneTargets::new(
            device,
            &layouts.texture,
            &sampler,
            viewport.width,
            viewport.height,
        );

        let resources = SceneResources::load(
            &UploadContext {
                device,
                queue,
                texture_layout: &layouts.texture,
                material_layout: &layouts.material,
                cube_layout: &layouts.cube,
                sampler: &sampler,
                model_sampler: &model_sampler,
                white: &white,
            },
            root,
            manifest,
        );

        let frame_buffer = uniform_buffer(
            device,
            "frame_uniforms",
            std::mem::size_of::<FrameUniforms>() as u64,
        );
        let frame_bind_group =
            uniform_bind_group(device, &layouts.frame, &frame_buffer, "frame_bind_group");

        let object_buffer =
            uniform_buffer(device, "object_uniforms", MAX_OBJECTS as u64 * OBJECT_STRIDE);
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });

        let lights_size = std::mem::size_of::<LightsUniform>() as u64;
        let diamond_lights_buffer = uniform_buffer(device, "diamond_lights", lights_size);
        let diamond_lights_bind_group = uniform_bind_group(
            device,
            &layouts.lights,
            &diamond_lights_buffer,
            "diamond_lights_bind_group",
        );
        let planet_lights_buffer = uniform_buffer(device, "planet_lights", lights_size);
        let planet_lights_bind_group = uniform_bind_group(
            device,
            &layouts.lights,
            &planet_lights_buffer,
            "planet_lights_bind_group",
        );

        let composite_buffer = uniform_buffer(
            device,
            "composite_params",
            std::mem::size_of::<CompositeParams>() as u64,
        );
        let composite_bind_group = uniform_bind_group(
            device,
            &layouts.params,
            &composite_buffer,
            "composite_bind_group",
        );

        let blur_bind_groups = [false, true].map(|horizontal| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blur_params"),
                contents: bytemuck::bytes_of(&BlurParams {
                    horizontal: u32::from(horizontal),
                    _pad: [0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            uniform_bind_group(device, &layouts.params, &buffer, "blur_bind_group")
        });

        let cube = StaticMesh::new(device, "cube_vertices", &geometry::reflective_cube());
        let marker = StaticMesh::new(device, "marker_vertices", &geometry::cube_vertices(0.5));
        let skybox = StaticMesh::new(device, "skybox_vertices", &geometry::skybox_vertices());
        let window = StaticMesh::new(device, "window_vertices", &geometry::window_quad());

        tracing::info!(
            "renderer ready at {}x{}, {} diamond variants, {}/{} orbit models",
            viewport.width,
            viewport.height,
            resources.diamonds.len(),
            resources.planets.iter().filter(|p| p.is_some()).count(),
            resources.planets.len(),
        );

        Self {
            layouts,
            pipelines,
            sampler,
            targets,
            resources,
            viewport,
            frame_buffer,
            frame_bind_group,
            object_buffer,
            object_bind_group,
            diamond_lights_buffer,
            diamond_lights_bind_group,
            planet_lights_buffer,
            planet_lights_bind_group,
            composite_buffer,
            composite_bind_group,
            blur_bind_groups,
            cube,
            marker,
            skybox,
            window,
        }
    }

    /// Recreate the size-dependent targets. Scene state is untouched.
    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.targets = SceneTargets::new(
            device,
            &self.layouts.texture,
            &self.sampler,
            viewport.width,
            viewport.height,
        );
    }

    /// Bind a frame to a device and an output view.
    pub fn target<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        view: &'a wgpu::TextureView,
    ) -> GpuFrame<'a> {
        GpuFrame {
            renderer: self,
            device,
            queue,
            view,
        }
    }

    fn lights_group(&self, profile: Option<LightingProfile>) -> &wgpu::BindGroup {
        match profile {
            Some(LightingProfile::Diamond) => &self.diamond_lights_bind_group,
            _ => &self.planet_lights_bind_group,
        }
    }

    fn skybox_group(&self, layer: SkyboxLayer) -> &wgpu::BindGroup {
        match layer {
            SkyboxLayer::Sunset => &self.resources.sunset,
            SkyboxLayer::Universe => &self.resources.universe,
        }
    }

    /// Record draw calls for `draws`, appending their uniforms to `slots`.
    fn record<'r>(
        &'r self,
        frame: &Frame,
        draws: &[DrawItem],
        slots: &mut Vec<ObjectUniforms>,
    ) -> Vec<DrawCall<'r>> {
        let mut calls = Vec::new();
        let reflection = self.skybox_group(cube_environment(frame));

        for draw in draws {
            match draw.kind {
                DrawKind::ReflectiveCube { environment } => {
                    let Some(slot) = push_slot(
                        slots,
                        ObjectUniforms::new(draw.model, [1.0, 1.0, 1.0, draw.alpha], 0.0, false),
                    ) else {
                        continue;
                    };
                    calls.push(DrawCall {
                        pipeline: &self.pipelines.cube,
                        slot,
                        vertices: &self.cube.buffer,
                        indices: None,
                        vertex_count: self.cube.count,
                        groups: vec![self.skybox_group(environment)],
                    });
                }
                DrawKind::LightMarker(i) => {
                    let light = &frame.planet_lights.points[i % frame.planet_lights.points.len()];
                    let glow = light.diffuse * MARKER_INTENSITY + light.ambient;
                    let Some(slot) = push_slot(
                        slots,
                        ObjectUniforms::new(draw.model, glow.extend(1.0).to_array(), 0.0, false),
                    ) else {
                        continue;
                    };
                    calls.push(DrawCall {
                        pipeline: &self.pipelines.marker,
                        slot,
                        vertices: &self.marker.buffer,
                        indices: None,
                        vertex_count: self.marker.count,
                        groups: Vec::new(),
                    });
                }
                DrawKind::Diamond(color) => {
                    let Some(model) = self.resources.diamonds.get(&color) else {
                        continue;
                    };
                    self.record_model(model, draw, slots, &mut calls, |_| Some(reflection));
                }
                DrawKind::Planet(i) => {
                    let Some(Some(model)) = self.resources.planets.get(i) else {
                        continue;
                    };
                    self.record_model(model, draw, slots, &mut calls, |m| m.maps.as_ref());
                }
                DrawKind::Window => {
                    let Some(texture) = self.resources.window.as_ref() else {
                        continue;
                    };
                    let Some(slot) = push_slot(
                        slots,
                        ObjectUniforms::new(draw.model, [1.0, 1.0, 1.0, draw.alpha], 0.0, false),
                    ) else {
                        continue;
                    };
                    calls.push(DrawCall {
                        pipeline: &self.pipelines.window,
                        slot,
                        vertices: &self.window.buffer,
                        indices: None,
                        vertex_count: self.window.count,
                        groups: vec![texture],
                    });
                }
            }
        }
        calls
    }

    fn record_model<'r>(
        &'r self,
        model: &'r GpuModel,
        draw: &DrawItem,
        slots: &mut Vec<ObjectUniforms>,
        calls: &mut Vec<DrawCall<'r>>,
        surface: impl Fn(&'r GpuMaterial) -> Option<&'r wgpu::BindGroup>,
    ) {
        let pipeline = match draw.kind {
            DrawKind::Diamond(_) => &self.pipelines.diamond,
            _ => &self.pipelines.planet,
        };
        let lights = self.lights_group(draw.lighting);

        for mesh in &model.meshes {
            let material = model.material(mesh);
            let Some(texture) = surface(material) else {
                continue;
            };
            let [r, g, b] = material.tint;
            let Some(slot) = push_slot(
                slots,
                ObjectUniforms::new(
                    draw.model,
                    [r, g, b, draw.alpha],
                    material.shininess,
                    material.single_channel,
                )
                .with_specular(material.specular),
            ) else {
                return;
            };
            calls.push(DrawCall {
                pipeline,
                slot,
                vertices: &mesh.vertex_buffer,
                indices: Some((&mesh.index_buffer, mesh.index_count)),
                vertex_count: 0,
                groups: vec![lights, texture],
            });
        }
    }

    fn draw<'p>(&self, pass: &mut wgpu::RenderPass<'p>, calls: &[DrawCall<'_>]) {
        for call in calls {
            pass.set_pipeline(call.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_bind_group(
                1,
                &self.object_bind_group,
                &[call.slot * OBJECT_STRIDE as u32],
            );
            for (i, group) in call.groups.iter().enumerate() {
                pass.set_bind_group(2 + i as u32, *group, &[]);
            }
            pass.set_vertex_buffer(0, call.vertices.slice(..));
            match call.indices {
                Some((buffer, count)) => {
                    pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..count, 0, 0..1);
                }
                None => pass.draw(0..call.vertex_count, 0..1),
            }
        }
    }

    fn encode(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &Frame,
    ) -> wgpu::CommandBuffer {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_frame(frame)),
        );
        queue.write_buffer(
            &self.diamond_lights_buffer,
            0,
            bytemuck::bytes_of(&LightsUniform::from(&frame.diamond_lights)),
        );
        queue.write_buffer(
            &self.planet_lights_buffer,
            0,
            bytemuck::bytes_of(&LightsUniform::from(&frame.planet_lights)),
        );

        let mut slots = Vec::with_capacity(frame.draw_count());
        let opaque = self.record(frame, &frame.opaque, &mut slots);
        let models = self.record(frame, &frame.models, &mut slots);
        let transparent = self.record(frame, &frame.transparent, &mut slots);
        if !slots.is_empty() {
            let mut bytes = vec![0u8; slots.len() * OBJECT_STRIDE as usize];
            for (i, uniforms) in slots.iter().enumerate() {
                let start = i * OBJECT_STRIDE as usize;
                let data = bytemuck::bytes_of(uniforms);
                bytes[start..start + data.len()].copy_from_slice(data);
            }
            queue.write_buffer(&self.object_buffer, 0, &bytes);
        }

        let clear = frame
            .passes
            .iter()
            .find_map(|p| match p {
                Pass::Clear { color } => Some(*color),
                _ => None,
            })
            .unwrap_or(Vec3::ZERO);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.targets.color,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(to_color(clear)),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.targets.bright,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for step in &frame.passes {
                match step {
                    Pass::Opaque => self.draw(&mut pass, &opaque),
                    Pass::Models => self.draw(&mut pass, &models),
                    Pass::Transparent => self.draw(&mut pass, &transparent),
                    Pass::Skybox(layer) => {
                        let pipeline = match layer {
                            SkyboxLayer::Sunset => &self.pipelines.skybox_sunset,
                            SkyboxLayer::Universe => &self.pipelines.skybox_universe,
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_bind_group(0, &self.frame_bind_group, &[]);
                        pass.set_bind_group(1, self.skybox_group(*layer), &[]);
                        pass.set_vertex_buffer(0, self.skybox.buffer.slice(..));
                        pass.draw(0..self.skybox.count, 0..1);
                    }
                    _ => {}
                }
            }
        }

        for step in &frame.passes {
            match *step {
                Pass::Blur {
                    direction,
                    source,
                    target,
                } => {
                    let input = match source {
                        BlurSource::Bright => &self.targets.bright_bind_group,
                        BlurSource::PingPong(i) => &self.targets.pingpong_bind_groups[i % 2],
                    };
                    let params =
                        &self.blur_bind_groups[usize::from(direction == BlurDirection::Horizontal)];
                    run_fullscreen(
                        &mut encoder,
                        "blur_pass",
                        &self.targets.pingpong[target % 2],
                        &self.pipelines.blur,
                        &[params, input],
                    );
                }
                Pass::Composite {
                    bloom,
                    exposure,
                    blurred,
                } => {
                    queue.write_buffer(
                        &self.composite_buffer,
                        0,
                        bytemuck::bytes_of(&CompositeParams {
                            bloom: u32::from(bloom),
                            exposure,
                            _pad: [0.0; 2],
                        }),
                    );
                    run_fullscreen(
                        &mut encoder,
                        "composite_pass",
                        view,
                        &self.pipelines.composite,
                        &[
                            &self.composite_bind_group,
                            &self.targets.color_bind_group,
                            &self.targets.pingpong_bind_groups[blurred % 2],
                        ],
                    );
                }
                // The overlay is drawn by the UI layer after this command buffer.
                _ => {}
            }
        }

        encoder.finish()
    }
}

/// Append a slot, or `None` once every slot is taken.
fn push_slot(slots: &mut Vec<ObjectUniforms>, uniforms: ObjectUniforms) -> Option<u32> {
    if slots.len() >= MAX_OBJECTS {
        tracing::warn!("draw skipped: more than {MAX_OBJECTS} objects in one frame");
        return None;
    }
    slots.push(uniforms);
    Some(slots.len() as u32 - 1)
}

fn run_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    groups: &[&wgpu::BindGroup],
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    for (i, group) in groups.iter().enumerate() {
        pass.set_bind_group(i as u32, *group, &[]);
    }
    pass.draw(0..3, 0..1);
}

/// A renderer bound to one output view for one frame.
pub struct GpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
}

impl Renderer for GpuFrame<'_> {
    type Output = wgpu::CommandBuffer;

    fn render(&mut self, frame: &Frame) -> wgpu::CommandBuffer {
        if frame.viewport != self.renderer.viewport {
            self.renderer.resize(self.device, frame.viewport);
        }
        self.renderer
            .encode(self.device, self.queue, self.view, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_render::plan_frame;
    use diamond_scene::ProgramState;

    #[test]
    fn object_slots_fit_a_default_frame() {
        let state = ProgramState::default();
        let frame = plan_frame(&state, &SceneManifest::default(), Viewport::default(), 0.0);
        assert!(frame.draw_count() < MAX_OBJECTS);
        assert_eq!(MAX_OBJECTS as u64 * OBJECT_STRIDE, 65_536);
    }

    #[test]
    fn slots_run_out_at_capacity() {
        let mut slots = Vec::new();
        let uniforms = ObjectUniforms::new(glam::Mat4::IDENTITY, [1.0; 4], 0.0, false);
        for expected in 0..MAX_OBJECTS as u32 {
            assert_eq!(push_slot(&mut slots, uniforms), Some(expected));
        }
        assert_eq!(push_slot(&mut slots, uniforms), None);
    }

    #[test]
    fn cube_environment_follows_the_zone() {
        let mut state = ProgramState::default();
        let manifest = SceneManifest::default();
        let frame = plan_frame(&state, &manifest, Viewport::default(), 0.0);
        assert_eq!(cube_environment(&frame), SkyboxLayer::Sunset);

        state.camera.position = Vec3::ZERO;
        state.update_special_zone();
        let frame = plan_frame(&state, &manifest, Viewport::default(), 0.0);
        assert_eq!(cube_environment(&frame), SkyboxLayer::Universe);
    }
}
