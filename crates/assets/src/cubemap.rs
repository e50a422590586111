use crate::AssetError;
use std::path::{Path, PathBuf};

/// One decoded cubemap face, always RGBA8.
#[derive(Debug, Clone)]
pub struct FaceImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Six faces in +X, -X, +Y, -Y, +Z, -Z order. A face that failed to load is
/// `None` and stays uninitialised on the GPU.
#[derive(Debug, Clone)]
pub struct CubemapData {
    pub paths: [PathBuf; 6],
    pub faces: [Option<FaceImage>; 6],
}

impl CubemapData {
    pub fn is_complete(&self) -> bool {
        self.faces.iter().all(Option::is_some)
    }

    /// Indices of faces that did not load.
    pub fn missing(&self) -> Vec<usize> {
        (0..6).filter(|&i| self.faces[i].is_none()).collect()
    }

    /// Edge length taken from the first face that loaded.
    pub fn face_size(&self) -> Option<(u32, u32)> {
        self.faces.iter().flatten().next().map(|f| (f.width, f.height))
    }

    /// Faces that can be uploaded into a cube of `face_size()`. Faces of a
    /// different size are logged and skipped.
    pub fn uploadable_faces(&self) -> Vec<(usize, &FaceImage)> {
        let Some(size) = self.face_size() else {
            return Vec::new();
        };
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, face)| face.as_ref().map(|f| (i, f)))
            .filter(|(i, f)| {
                let matches = (f.width, f.height) == size;
                if !matches {
                    tracing::warn!(
                        "cubemap face {} is {}x{}, expected {}x{}; skipped",
                        self.paths[*i].display(),
                        f.width,
                        f.height,
                        size.0,
                        size.1
                    );
                }
                matches
            })
            .collect()
    }
}

fn decode_face(path: &Path) -> Result<FaceImage, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(FaceImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Load six cubemap faces. Unreadable faces are logged and left empty; the
/// remaining faces still load.
pub fn load_cubemap(paths: [PathBuf; 6]) -> CubemapData {
    let faces = std::array::from_fn(|i| match decode_face(&paths[i]) {
        Ok(face) => Some(face),
        Err(e) => {
            tracing::warn!(
                "cubemap texture failed to load at path: {} ({e})",
                paths[i].display()
            );
            None
        }
    });
    let data = CubemapData { paths, faces };
    if data.is_complete() {
        tracing::debug!("cubemap loaded from {}", data.paths[0].display());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

    fn write_faces(dir: &Path, size: u32) -> [PathBuf; 6] {
        std::array::from_fn(|i| {
            let path = dir.join(format!("{}.jpg", NAMES[i]));
            RgbImage::from_pixel(size, size, Rgb([40 * i as u8, 100, 200]))
                .save(&path)
                .unwrap();
            path
        })
    }

    #[test]
    fn loads_all_six_jpeg_faces() {
        let dir = tempfile::tempdir().unwrap();
        let cube = load_cubemap(write_faces(dir.path(), 16));
        assert!(cube.is_complete());
        assert_eq!(cube.face_size(), Some((16, 16)));
        assert_eq!(cube.uploadable_faces().len(), 6);
        for face in cube.faces.iter().flatten() {
            assert_eq!(face.rgba.len(), 16 * 16 * 4);
        }
    }

    #[test]
    fn unreadable_face_is_left_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_faces(dir.path(), 8);
        paths[2] = dir.path().join("missing_top.jpg");
        std::fs::write(dir.path().join("garbage.jpg"), b"not a jpeg").unwrap();
        paths[4] = dir.path().join("garbage.jpg");

        let cube = load_cubemap(paths);
        assert!(!cube.is_complete());
        assert_eq!(cube.missing(), vec![2, 4]);
        assert_eq!(cube.uploadable_faces().len(), 4);
    }

    #[test]
    fn mismatched_face_is_skipped_for_upload() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_faces(dir.path(), 8);
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save(&paths[5])
            .unwrap();

        let cube = load_cubemap(paths);
        assert!(cube.is_complete());
        let uploadable: Vec<usize> = cube.uploadable_faces().iter().map(|(i, _)| *i).collect();
        assert_eq!(uploadable, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn all_missing_has_no_size() {
        let dir = tempfile::tempdir().unwrap();
        let paths = std::array::from_fn(|i| dir.path().join(format!("{i}.jpg")));
        let cube = load_cubemap(paths);
        assert_eq!(cube.missing().len(), 6);
        assert_eq!(cube.face_size(), None);
        assert!(cube.uploadable_faces().is_empty());
    }
}
