//! Size-dependent render targets, rebuilt on resize.

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Bind a texture view and sampler at bindings 0 and 1.
pub fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// HDR scene target (colour + bright attachments, depth) and the two
/// ping-pong blur buffers, each with a sampling bind group.
pub struct SceneTargets {
    pub color: wgpu::TextureView,
    pub bright: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub pingpong: [wgpu::TextureView; 2],
    pub color_bind_group: wgpu::BindGroup,
    pub bright_bind_group: wgpu::BindGroup,
    pub pingpong_bind_groups: [wgpu::BindGroup; 2],
}

impl SceneTargets {
    pub fn new(
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let color = create_target(device, "hdr_color", HDR_FORMAT, width, height);
        let bright = create_target(device, "hdr_bright", HDR_FORMAT, width, height);
        let depth = create_target(device, "hdr_depth", DEPTH_FORMAT, width, height);
        let pingpong = [
            create_target(device, "pingpong_0", HDR_FORMAT, width, height),
            create_target(device, "pingpong_1", HDR_FORMAT, width, height),
        ];

        let color_bind_group =
            texture_bind_group(device, texture_layout, &color, sampler, "hdr_color_bg");
        let bright_bind_group =
            texture_bind_group(device, texture_layout, &bright, sampler, "hdr_bright_bg");
        let pingpong_bind_groups = [
            texture_bind_group(device, texture_layout, &pingpong[0], sampler, "pingpong_0_bg"),
            texture_bind_group(device, texture_layout, &pingpong[1], sampler, "pingpong_1_bg"),
        ];

        tracing::debug!("scene targets created at {width}x{height}");

        Self {
            color,
            bright,
            depth,
            pingpong,
            color_bind_group,
            bright_bind_group,
            pingpong_bind_groups,
        }
    }
}
