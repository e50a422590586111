use diamond_common::DiamondColor;
use diamond_scene::{CameraMovement, ProgramState};

/// Exposure change per second while Q or E is held.
pub const EXPOSURE_RATE: f32 = 0.5;

/// A scene mutation produced by input. The app applies actions to
/// `ProgramState`; nothing else writes to it from input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    MoveCamera(CameraMovement),
    SelectDiamond(DiamondColor),
    ToggleBloom,
    /// Signed direction; scaled by `EXPOSURE_RATE` and the frame delta.
    AdjustExposure(f32),
    ToggleSettingsPanel,
    ToggleInfoPanel,
    ToggleBling,
    /// Cursor offsets in pixels, y already flipped so positive looks up.
    Look { dx: f32, dy: f32 },
    Zoom(f32),
    Quit,
}

impl Action {
    /// Apply to the scene. `delta_time` only matters for continuous actions.
    pub fn apply(&self, state: &mut ProgramState, delta_time: f32) {
        match *self {
            Action::MoveCamera(direction) => state.camera.process_keyboard(direction, delta_time),
            Action::SelectDiamond(color) => state.set_diamond_color(color),
            Action::ToggleBloom => state.toggle_bloom(),
            Action::AdjustExposure(direction) => {
                state.adjust_exposure(direction * EXPOSURE_RATE * delta_time)
            }
            Action::ToggleSettingsPanel => state.toggle_settings_panel(),
            Action::ToggleInfoPanel => state.toggle_info_panel(),
            Action::ToggleBling => state.toggle_bling(),
            Action::Look { dx, dy } => state.camera.process_mouse_movement(dx, dy, true),
            Action::Zoom(amount) => state.camera.process_mouse_scroll(amount),
            Action::Quit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn move_uses_delta_time() {
        let mut state = ProgramState::default();
        Action::MoveCamera(CameraMovement::Backward).apply(&mut state, 2.0);
        assert!((state.camera.position - Vec3::new(0.0, 0.0, 12.0)).length() < 1e-5);
    }

    #[test]
    fn select_diamond_sets_color() {
        let mut state = ProgramState::default();
        Action::SelectDiamond(DiamondColor::Pink).apply(&mut state, 0.016);
        assert_eq!(state.diamond_color, DiamondColor::Pink);
    }

    #[test]
    fn exposure_scales_with_delta() {
        let mut state = ProgramState::default();
        Action::AdjustExposure(1.0).apply(&mut state, 1.0);
        assert_eq!(state.exposure, 1.0 + EXPOSURE_RATE);
    }

    #[test]
    fn quit_leaves_state_alone() {
        let mut state = ProgramState::default();
        Action::Quit.apply(&mut state, 1.0);
        assert_eq!(state, ProgramState::default());
    }
}
