use diamond_assets::{CubemapData, PixelFormat, TextureData};

/// A sampled 2D texture on the GPU.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub single_channel: bool,
}

fn wgpu_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
        PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

/// Whether both sides fit within the device's 2D texture limit.
fn fits_limit(width: u32, height: u32, max_dimension: u32) -> bool {
    width > 0 && height > 0 && width <= max_dimension && height <= max_dimension
}

/// Upload a decoded texture with every mip level it carries. Textures larger
/// than the device allows are logged and skipped.
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
    label: &str,
) -> Option<GpuTexture> {
    let max = device.limits().max_texture_dimension_2d;
    if !fits_limit(data.width, data.height, max) {
        tracing::error!(
            "texture {label} is {}x{}, outside the device limit of {max}; skipped",
            data.width,
            data.height
        );
        return None;
    }
    Some(create_texture(device, queue, data, label))
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
    label: &str,
) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: data.mips.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu_format(data.format),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let bpp = data.format.bytes_per_pixel();
    for (level, pixels) in data.mips.iter().enumerate() {
        let (width, height) = data.mip_size(level);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bpp),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        view,
        single_channel: data.format == PixelFormat::R8,
    }
}

/// 1x1 white texture bound for materials that name no diffuse map.
pub fn white_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> GpuTexture {
    let data = TextureData {
        width: 1,
        height: 1,
        format: PixelFormat::Rgba8,
        source_channels: 4,
        mips: vec![vec![255; 4]],
    };
    create_texture(device, queue, &data, "white_texture")
}

/// Upload the faces that loaded into a cube texture. Faces that failed stay
/// zeroed. With no usable face, or faces above the device limit, the cube is
/// 1x1.
pub fn upload_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &CubemapData,
    label: &str,
) -> wgpu::TextureView {
    let max = device.limits().max_texture_dimension_2d;
    let edge = match data.face_size() {
        Some((w, h)) if w == h && fits_limit(w, h, max) => w,
        Some((w, h)) if w == h => {
            tracing::error!(
                "cubemap {label} faces are {w}x{h}, outside the device limit of {max}"
            );
            1
        }
        Some((w, h)) => {
            tracing::error!("cubemap {label} faces must be square, got {w}x{h}");
            1
        }
        None => {
            tracing::error!("cubemap {label} has no readable faces");
            1
        }
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: edge,
            height: edge,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (index, face) in data.uploadable_faces() {
        if face.width != edge {
            continue;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: index as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &face.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(edge * 4),
                rows_per_image: Some(edge),
            },
            wgpu::Extent3d {
                width: edge,
                height: edge,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_within_the_limit_fit() {
        assert!(fits_limit(1, 1, 8192));
        assert!(fits_limit(8192, 2048, 8192));
    }

    #[test]
    fn oversized_or_empty_textures_do_not_fit() {
        assert!(!fits_limit(8193, 16, 8192));
        assert!(!fits_limit(16, 16_384, 8192));
        assert!(!fits_limit(0, 16, 8192));
    }
}
