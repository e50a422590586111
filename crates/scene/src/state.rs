use crate::camera::Camera;
use crate::lighting::{LightRig, LightingProfile};
use diamond_common::DiamondColor;
use glam::Vec3;

/// Half extent of the reflective cube. The camera is "in the special zone"
/// while it is inside this box.
pub const CUBE_HALF_EXTENT: f32 = 1.5;

pub const MIN_EXPOSURE: f32 = 0.0;

/// All mutable program state. Owned by the app and lent to the input
/// handler, the frame planner and the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramState {
    pub clear_color: Vec3,
    pub settings_panel_enabled: bool,
    pub info_panel_enabled: bool,
    pub camera_mouse_update_enabled: bool,
    pub camera: Camera,
    pub diamond_scale: f32,
    pub diamond_transparency: f32,
    pub diamond_color: DiamondColor,
    pub bloom_enabled: bool,
    pub exposure: f32,
    pub bling: bool,
    pub in_special_zone: bool,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            clear_color: Vec3::splat(0.1),
            settings_panel_enabled: false,
            info_panel_enabled: false,
            camera_mouse_update_enabled: true,
            camera: Camera::default(),
            diamond_scale: 1.0,
            diamond_transparency: 0.7,
            diamond_color: DiamondColor::default(),
            bloom_enabled: true,
            exposure: 1.0,
            bling: true,
            in_special_zone: false,
        }
    }
}

impl ProgramState {
    /// Opening the settings panel releases the mouse for the UI; closing it
    /// hands the mouse back to the camera.
    pub fn toggle_settings_panel(&mut self) {
        self.settings_panel_enabled = !self.settings_panel_enabled;
        self.camera_mouse_update_enabled = !self.settings_panel_enabled;
        tracing::debug!(open = self.settings_panel_enabled, "settings panel toggled");
    }

    pub fn toggle_info_panel(&mut self) {
        self.info_panel_enabled = !self.info_panel_enabled;
    }

    pub fn toggle_bling(&mut self) {
        self.bling = !self.bling;
        tracing::info!(bling = self.bling, "lighting toggled");
    }

    pub fn toggle_bloom(&mut self) {
        self.bloom_enabled = !self.bloom_enabled;
        tracing::info!(bloom = self.bloom_enabled, "bloom toggled");
    }

    pub fn set_diamond_color(&mut self, color: DiamondColor) {
        if self.diamond_color != color {
            tracing::debug!("diamond color -> {}", color.name());
        }
        self.diamond_color = color;
    }

    pub fn adjust_exposure(&mut self, delta: f32) {
        self.exposure = (self.exposure + delta).max(MIN_EXPOSURE);
    }

    /// Recompute the derived zone flag from the camera position.
    pub fn update_special_zone(&mut self) {
        let p = self.camera.position.abs();
        let inside = p.max_element() < CUBE_HALF_EXTENT;
        if inside != self.in_special_zone {
            tracing::debug!(inside, "special zone changed");
        }
        self.in_special_zone = inside;
    }

    pub fn lights(&self, profile: LightingProfile) -> LightRig {
        profile.rig(&self.camera, self.bling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bling_round_trip_restores_lights() {
        let mut state = ProgramState::default();
        let before = [
            state.lights(LightingProfile::Diamond),
            state.lights(LightingProfile::Planet),
        ];
        state.toggle_bling();
        assert_ne!(state.lights(LightingProfile::Diamond), before[0]);
        state.toggle_bling();
        assert_eq!(state.lights(LightingProfile::Diamond), before[0]);
        assert_eq!(state.lights(LightingProfile::Planet), before[1]);
    }

    #[test]
    fn settings_panel_releases_mouse() {
        let mut state = ProgramState::default();
        state.toggle_settings_panel();
        assert!(state.settings_panel_enabled);
        assert!(!state.camera_mouse_update_enabled);
        state.toggle_settings_panel();
        assert!(state.camera_mouse_update_enabled);
    }

    #[test]
    fn exposure_never_negative() {
        let mut state = ProgramState::default();
        state.adjust_exposure(-5.0);
        assert_eq!(state.exposure, 0.0);
        state.adjust_exposure(0.25);
        assert_eq!(state.exposure, 0.25);
    }

    #[test]
    fn special_zone_tracks_camera() {
        let mut state = ProgramState::default();
        state.update_special_zone();
        assert!(!state.in_special_zone);
        state.camera.position = Vec3::new(0.5, -1.0, 1.2);
        state.update_special_zone();
        assert!(state.in_special_zone);
        state.camera.position = Vec3::new(0.5, -1.0, 1.6);
        state.update_special_zone();
        assert!(!state.in_special_zone);
    }
}
