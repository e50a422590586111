//! Resource loading for the demo.
//!
//! Everything here is CPU-side: files are decoded into plain byte buffers and
//! handed to the GPU backend for upload. Paths are resolved against a
//! resource root.
//!
//! # Failure policy
//! A missing or unreadable file is logged with its path and the caller keeps
//! going with whatever did load. Nothing is retried and no placeholder is
//! substituted.

mod cubemap;
mod model;
mod texture;

use std::path::{Path, PathBuf};

pub use cubemap::{CubemapData, FaceImage, load_cubemap};
pub use model::{MaterialInfo, MeshData, ModelData, ModelVertex, load_model};
pub use texture::{PixelFormat, TextureData, decode_texture, load_texture, mip_level_count};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("image error in {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("OBJ error in {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

/// Directory every relative asset path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot {
    root: PathBuf,
}

impl ResourceRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn resolve_all<const N: usize>(&self, relative: &[String; N]) -> [PathBuf; N] {
        std::array::from_fn(|i| self.resolve(&relative[i]))
    }
}

impl Default for ResourceRoot {
    fn default() -> Self {
        Self::new("resources")
    }
}
