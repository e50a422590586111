//! Layout, one value per line:
//! ```text
//! clear_color.r clear_color.g clear_color.b
//! settings_panel_enabled info_panel_enabled camera_mouse_update_enabled  (0/1)
//! camera.position.x y z
//! camera.front.x y z
//! camera.pitch camera.yaw
//! diamond_scale diamond_transparency
//! ```

use diamond_scene::{Camera, ProgramState};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Errors from reading or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// Result of a load attempt that did not hit an IO error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file on disk; state left at defaults.
    Missing,
    /// Every field was read.
    Complete,
    /// Only the first `fields_read` fields were applied.
    Partial { fields_read: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ClearR,
    ClearG,
    ClearB,
    SettingsPanel,
    InfoPanel,
    CameraMouseUpdate,
    PositionX,
    PositionY,
    PositionZ,
    FrontX,
    FrontY,
    FrontZ,
    Pitch,
    Yaw,
    DiamondScale,
    DiamondTransparency,
}

const FIELD_ORDER: [Field; 16] = [
    Field::ClearR,
    Field::ClearG,
    Field::ClearB,
    Field::SettingsPanel,
    Field::InfoPanel,
    Field::CameraMouseUpdate,
    Field::PositionX,
    Field::PositionY,
    Field::PositionZ,
    Field::FrontX,
    Field::FrontY,
    Field::FrontZ,
    Field::Pitch,
    Field::Yaw,
    Field::DiamondScale,
    Field::DiamondTransparency,
];

pub const FIELD_COUNT: usize = FIELD_ORDER.len();

enum Value {
    Float(f32),
    Flag(bool),
}

impl Field {
    /// Position in `FIELD_ORDER`.
    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Field::ClearR => "clear_color.r",
            Field::ClearG => "clear_color.g",
            Field::ClearB => "clear_color.b",
            Field::SettingsPanel => "settings_panel_enabled",
            Field::InfoPanel => "info_panel_enabled",
            Field::CameraMouseUpdate => "camera_mouse_update_enabled",
            Field::PositionX => "camera.position.x",
            Field::PositionY => "camera.position.y",
            Field::PositionZ => "camera.position.z",
            Field::FrontX => "camera.front.x",
            Field::FrontY => "camera.front.y",
            Field::FrontZ => "camera.front.z",
            Field::Pitch => "camera.pitch",
            Field::Yaw => "camera.yaw",
            Field::DiamondScale => "diamond_scale",
            Field::DiamondTransparency => "diamond_transparency",
        }
    }

    fn is_flag(self) -> bool {
        matches!(
            self,
            Field::SettingsPanel | Field::InfoPanel | Field::CameraMouseUpdate
        )
    }

    fn get(self, state: &ProgramState) -> Value {
        let cam = &state.camera;
        match self {
            Field::ClearR => Value::Float(state.clear_color.x),
            Field::ClearG => Value::Float(state.clear_color.y),
            Field::ClearB => Value::Float(state.clear_color.z),
            Field::SettingsPanel => Value::Flag(state.settings_panel_enabled),
            Field::InfoPanel => Value::Flag(state.info_panel_enabled),
            Field::CameraMouseUpdate => Value::Flag(state.camera_mouse_update_enabled),
            Field::PositionX => Value::Float(cam.position.x),
            Field::PositionY => Value::Float(cam.position.y),
            Field::PositionZ => Value::Float(cam.position.z),
            Field::FrontX => Value::Float(cam.front.x),
            Field::FrontY => Value::Float(cam.front.y),
            Field::FrontZ => Value::Float(cam.front.z),
            Field::Pitch => Value::Float(cam.pitch),
            Field::Yaw => Value::Float(cam.yaw),
            Field::DiamondScale => Value::Float(state.diamond_scale),
            Field::DiamondTransparency => Value::Float(state.diamond_transparency),
        }
    }

    fn set(self, state: &mut ProgramState, value: Value) {
        let cam = &mut state.camera;
        match (self, value) {
            (Field::ClearR, Value::Float(v)) => state.clear_color.x = v,
            (Field::ClearG, Value::Float(v)) => state.clear_color.y = v,
            (Field::ClearB, Value::Float(v)) => state.clear_color.z = v,
            (Field::SettingsPanel, Value::Flag(v)) => state.settings_panel_enabled = v,
            (Field::InfoPanel, Value::Flag(v)) => state.info_panel_enabled = v,
            (Field::CameraMouseUpdate, Value::Flag(v)) => state.camera_mouse_update_enabled = v,
            (Field::PositionX, Value::Float(v)) => cam.position.x = v,
            (Field::PositionY, Value::Float(v)) => cam.position.y = v,
            (Field::PositionZ, Value::Float(v)) => cam.position.z = v,
            (Field::FrontX, Value::Float(v)) => cam.front.x = v,
            (Field::FrontY, Value::Float(v)) => cam.front.y = v,
            (Field::FrontZ, Value::Float(v)) => cam.front.z = v,
            (Field::Pitch, Value::Float(v)) => cam.pitch = v,
            (Field::Yaw, Value::Float(v)) => cam.yaw = v,
            (Field::DiamondScale, Value::Float(v)) => state.diamond_scale = v,
            (Field::DiamondTransparency, Value::Float(v)) => state.diamond_transparency = v,
            _ => {}
        }
    }

    fn parse(self, token: &str) -> Result<Value, StateFileError> {
        let invalid = || StateFileError::InvalidValue {
            field: self.name(),
            value: token.to_string(),
        };
        if self.is_flag() {
            match token {
                "0" => Ok(Value::Flag(false)),
                "1" => Ok(Value::Flag(true)),
                _ => Err(invalid()),
            }
        } else {
            token.parse::<f32>().map(Value::Float).map_err(|_| invalid())
        }
    }
}

/// Serialize every persisted field, one per line.
pub fn render(state: &ProgramState) -> String {
    let mut out = String::new();
    for field in FIELD_ORDER {
        // Writing into a String cannot fail.
        let _ = match field.get(state) {
            Value::Float(v) => writeln!(out, "{v}"),
            Value::Flag(v) => writeln!(out, "{}", u8::from(v)),
        };
    }
    out
}

/// Apply fields from `text` in order, stopping at the first token that is
/// missing or malformed. Returns how many fields were applied.
pub fn apply(text: &str, state: &mut ProgramState) -> usize {
    let mut tokens = text.split_whitespace();
    let mut read = 0;
    for field in FIELD_ORDER {
        let Some(token) = tokens.next() else {
            break;
        };
        match field.parse(token) {
            Ok(value) => {
                field.set(state, value);
                read += 1;
            }
            Err(e) => {
                tracing::warn!("state file: {e}");
                break;
            }
        }
    }

    // Orientation is applied only as a whole; right/up must agree with front.
    let cam = &mut state.camera;
    if read > Field::Yaw.index() {
        let (front, pitch, yaw) = (cam.front, cam.pitch, cam.yaw);
        cam.restore_orientation(front, pitch, yaw);
    } else if read > Field::FrontX.index() {
        tracing::warn!("partial camera orientation ignored");
        *cam = Camera::new(cam.position);
    }
    read
}

/// Handle to the on-disk state file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overlay persisted values onto `state`.
    pub fn load_into(&self, state: &mut ProgramState) -> Result<LoadOutcome, StateFileError> {
        if !self.path.exists() {
            tracing::info!("no state file at {}, using defaults", self.path.display());
            return Ok(LoadOutcome::Missing);
        }
        let text = std::fs::read_to_string(&self.path)?;
        let read = apply(&text, state);
        if read == FIELD_COUNT {
            tracing::info!("program state loaded from {}", self.path.display());
            Ok(LoadOutcome::Complete)
        } else {
            tracing::warn!(
                "state file {} is short: {read}/{FIELD_COUNT} fields read",
                self.path.display()
            );
            Ok(LoadOutcome::Partial { fields_read: read })
        }
    }

    pub fn save(&self, state: &ProgramState) -> Result<(), StateFileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, render(state))?;
        tracing::info!("program state saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_state() -> ProgramState {
        let mut state = ProgramState::default();
        state.clear_color = Vec3::new(0.123_456_79, 1.0e-7, 0.9);
        state.settings_panel_enabled = true;
        state.info_panel_enabled = true;
        state.camera_mouse_update_enabled = false;
        state.camera.position = Vec3::new(-3.25, 1.0 / 3.0, 1234.567);
        state.camera.restore_orientation(Vec3::new(0.6, 0.0, -0.8), 0.0, -53.130_104);
        state.camera.pitch = 12.5;
        state.diamond_scale = 2.718_281_7;
        state.diamond_transparency = 0.333_333_34;
        state
    }

    #[test]
    fn save_then_load_reproduces_fields() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("program_state.txt"));
        let saved = sample_state();
        file.save(&saved).unwrap();

        let mut loaded = ProgramState::default();
        assert_eq!(file.load_into(&mut loaded).unwrap(), LoadOutcome::Complete);

        assert_eq!(loaded.clear_color, saved.clear_color);
        assert_eq!(loaded.settings_panel_enabled, saved.settings_panel_enabled);
        assert_eq!(loaded.info_panel_enabled, saved.info_panel_enabled);
        assert_eq!(
            loaded.camera_mouse_update_enabled,
            saved.camera_mouse_update_enabled
        );
        assert_eq!(loaded.camera.position, saved.camera.position);
        assert_eq!(loaded.camera.front, saved.camera.front);
        assert_eq!(loaded.camera.pitch, saved.camera.pitch);
        assert_eq!(loaded.camera.yaw, saved.camera.yaw);
        assert_eq!(loaded.diamond_scale, saved.diamond_scale);
        assert_eq!(loaded.diamond_transparency, saved.diamond_transparency);
    }

    #[test]
    fn rendered_file_has_one_scalar_per_line() {
        let text = render(&ProgramState::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), FIELD_COUNT);
        assert_eq!(lines[0], "0.1");
        assert_eq!(lines[3], "0");
        assert_eq!(lines[5], "1");
        assert_eq!(lines[8], "7");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("absent.txt"));
        let mut state = ProgramState::default();
        assert_eq!(file.load_into(&mut state).unwrap(), LoadOutcome::Missing);
        assert_eq!(state, ProgramState::default());
    }

    #[test]
    fn short_file_applies_prefix_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "0.5\n0.25\n0.75\n1\n").unwrap();

        let mut state = ProgramState::default();
        let outcome = StateFile::new(&path).load_into(&mut state).unwrap();
        assert_eq!(outcome, LoadOutcome::Partial { fields_read: 4 });
        assert_eq!(state.clear_color, Vec3::new(0.5, 0.25, 0.75));
        assert!(state.settings_panel_enabled);
        assert!(!state.info_panel_enabled);
        assert_eq!(state.camera, ProgramState::default().camera);
    }

    #[test]
    fn cut_off_orientation_falls_back_to_default_view() {
        for text in [
            "0.1 0.1 0.1 0 0 1 1 2 3 0.3",
            "0.1 0.1 0.1 0 0 1 1 2 3 0.3 0.4 0.5 10",
        ] {
            let mut state = ProgramState::default();
            apply(text, &mut state);
            assert_eq!(
                state.camera,
                Camera::new(Vec3::new(1.0, 2.0, 3.0)),
                "{text}"
            );
            assert!((state.camera.front.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn field_index_matches_file_order() {
        for (i, field) in FIELD_ORDER.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn malformed_token_stops_reading() {
        let mut state = ProgramState::default();
        let read = apply("0.2 0.2 0.2 yes 1 1", &mut state);
        assert_eq!(read, 3);
        assert_eq!(state.clear_color, Vec3::splat(0.2));
        assert!(!state.settings_panel_enabled);
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("state.txt"));
        file.save(&ProgramState::default()).unwrap();
        assert!(file.path().exists());
    }
}
