use crate::AssetError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};
use std::path::Path;

/// GPU-facing pixel layout of a decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One channel.
    R8,
    /// Four channels; RGB and grey+alpha sources are expanded into this.
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A decoded 2D texture with its full mip chain, level 0 first.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Channel count of the source file.
    pub source_channels: u8,
    pub mips: Vec<Vec<u8>>,
}

impl TextureData {
    pub fn mip_size(&self, level: usize) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

/// Levels needed to go from `width x height` down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn mip_chain<P>(base: ImageBuffer<P, Vec<u8>>) -> Vec<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = base.dimensions();
    let levels = mip_level_count(width, height);
    let mut mips = Vec::with_capacity(levels as usize);
    let mut current = base;
    for level in 1..levels {
        let next = imageops::resize(
            &current,
            (width >> level).max(1),
            (height >> level).max(1),
            FilterType::Triangle,
        );
        mips.push(std::mem::replace(&mut current, next).into_raw());
    }
    mips.push(current.into_raw());
    mips
}

/// Decode an image into a texture, choosing the format from its channel count.
pub fn decode_texture(path: &Path) -> Result<TextureData, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_image(img))
}

fn from_image(img: DynamicImage) -> TextureData {
    let (width, height) = (img.width(), img.height());
    let source_channels = img.color().channel_count();
    let (format, mips) = match source_channels {
        1 => (PixelFormat::R8, mip_chain(img.to_luma8())),
        _ => (PixelFormat::Rgba8, mip_chain(img.to_rgba8())),
    };
    TextureData {
        width,
        height,
        format,
        source_channels,
        mips,
    }
}

/// Load a 2D texture, logging and returning `None` on failure.
pub fn load_texture(path: impl AsRef<Path>) -> Option<TextureData> {
    let path = path.as_ref();
    match decode_texture(path) {
        Ok(texture) => {
            tracing::debug!(
                "texture {} loaded: {}x{}, {} channel(s), {} mip level(s)",
                path.display(),
                texture.width,
                texture.height,
                texture.source_channels,
                texture.mips.len()
            );
            Some(texture)
        }
        Err(e) => {
            tracing::warn!("texture failed to load at path: {} ({e})", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn level_count_covers_largest_axis() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(8, 8), 4);
        assert_eq!(mip_level_count(512, 64), 10);
        assert_eq!(mip_level_count(5, 3), 3);
    }

    #[test]
    fn grey_image_is_single_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grey.png");
        GrayImage::from_pixel(8, 4, Luma([77])).save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!(tex.format, PixelFormat::R8);
        assert_eq!(tex.source_channels, 1);
        assert_eq!(tex.mips.len(), 4);
        assert_eq!(tex.mips[0].len(), 8 * 4);
        assert_eq!(tex.mips[3].len(), 1);
    }

    #[test]
    fn rgb_image_expands_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])).save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!(tex.format, PixelFormat::Rgba8);
        assert_eq!(tex.source_channels, 3);
        assert_eq!(&tex.mips[0][..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn rgba_image_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.png");
        RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 128])).save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!(tex.source_channels, 4);
        assert_eq!(tex.mips.len(), 2);
        assert_eq!(tex.mip_size(1), (1, 1));
        assert_eq!(&tex.mips[1][..], &[255, 0, 0, 128]);
    }

    #[test]
    fn missing_texture_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_texture(dir.path().join("nope.png")).is_none());
        assert!(matches!(
            decode_texture(&dir.path().join("nope.png")),
            Err(AssetError::Image { .. })
        ));
    }
}
