use crate::orbit::{OrbitBody, default_orbits};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MANIFEST_FILE: &str = "scene.json";

/// Cubemap face file stems in upload order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBEMAP_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Errors from reading a scene manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Asset paths and placements for the scene, relative to the resource root.
///
/// Every field has a built-in default; a `scene.json` only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneManifest {
    pub sunset_skybox: String,
    pub universe_skybox: String,
    pub skybox_extension: String,
    pub window_texture: String,
    pub windows: Vec<Vec3>,
    pub orbits: Vec<OrbitBody>,
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            sunset_skybox: "textures/sunset".into(),
            universe_skybox: "textures/universe".into(),
            skybox_extension: "jpg".into(),
            window_texture: "textures/window.png".into(),
            windows: vec![
                Vec3::new(-3.0, 0.0, -3.5),
                Vec3::new(3.2, 0.0, 3.0),
                Vec3::new(0.0, 1.0, 4.0),
                Vec3::new(-4.0, -1.0, 1.0),
                Vec3::new(4.0, 0.5, -2.0),
            ],
            orbits: default_orbits(),
        }
    }
}

impl SceneManifest {
    /// Read `scene.json` from the resource root, or fall back to defaults
    /// when the file does not exist.
    pub fn load(resource_root: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = resource_root.as_ref().join(MANIFEST_FILE);
        if !path.exists() {
            tracing::debug!(
                "no {} in {}, using built-in scene",
                MANIFEST_FILE,
                resource_root.as_ref().display()
            );
            return Ok(Self::default());
        }
        let manifest: SceneManifest = serde_json::from_reader(std::fs::File::open(&path)?)?;
        tracing::info!("scene manifest loaded from {}", path.display());
        Ok(manifest)
    }

    pub fn sunset_faces(&self) -> [String; 6] {
        self.faces(&self.sunset_skybox)
    }

    pub fn universe_faces(&self) -> [String; 6] {
        self.faces(&self.universe_skybox)
    }

    fn faces(&self, dir: &str) -> [String; 6] {
        CUBEMAP_FACES.map(|face| format!("{dir}/{face}.{}", self.skybox_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_follow_cubemap_order() {
        let manifest = SceneManifest::default();
        let faces = manifest.sunset_faces();
        assert_eq!(faces[0], "textures/sunset/right.jpg");
        assert_eq!(faces[3], "textures/sunset/bottom.jpg");
        assert_eq!(faces[5], "textures/sunset/back.jpg");
    }

    #[test]
    fn missing_manifest_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = SceneManifest::load(dir.path()).unwrap();
        assert_eq!(manifest, SceneManifest::default());
    }

    #[test]
    fn partial_manifest_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{ "window_texture": "textures/glass.png", "windows": [[1.0, 2.0, 3.0]] }"#,
        )
        .unwrap();
        let manifest = SceneManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.window_texture, "textures/glass.png");
        assert_eq!(manifest.windows, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(manifest.sunset_skybox, "textures/sunset");
        assert_eq!(manifest.orbits.len(), default_orbits().len());
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(matches!(
            SceneManifest::load(dir.path()),
            Err(ManifestError::Json(_))
        ));
    }
}
