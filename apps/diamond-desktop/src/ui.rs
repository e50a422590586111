//! egui panels: F1 settings, F2 info.

use diamond_common::DiamondColor;
use diamond_scene::ProgramState;
use glam::Vec3;

/// Smoothed frame timing shown in the info panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_ms: f32,
}

impl FrameStats {
    const SMOOTHING: f32 = 0.1;

    pub fn record(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let fps = 1.0 / dt;
        if self.fps == 0.0 {
            self.fps = fps;
        } else {
            self.fps += (fps - self.fps) * Self::SMOOTHING;
        }
        self.frame_ms = 1000.0 / self.fps;
    }
}

fn vec3_label(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

pub fn draw(ctx: &egui::Context, state: &mut ProgramState, stats: &FrameStats) {
    if state.settings_panel_enabled {
        settings_panel(ctx, state);
    }
    if state.info_panel_enabled {
        info_panel(ctx, state, stats);
    }
}

fn settings_panel(ctx: &egui::Context, state: &mut ProgramState) {
    egui::Window::new("Settings")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Clear color");
                let mut rgb = state.clear_color.to_array();
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    state.clear_color = Vec3::from_array(rgb);
                }
            });
            ui.separator();

            ui.heading("Diamond");
            ui.add(egui::Slider::new(&mut state.diamond_scale, 0.1..=3.0).text("scale"));
            ui.add(
                egui::Slider::new(&mut state.diamond_transparency, 0.0..=1.0).text("transparency"),
            );
            ui.horizontal(|ui| {
                for color in DiamondColor::ALL {
                    if ui
                        .radio(state.diamond_color == color, color.name())
                        .clicked()
                    {
                        state.set_diamond_color(color);
                    }
                }
            });
            ui.separator();

            ui.heading("Post-processing");
            ui.checkbox(&mut state.bloom_enabled, "bloom (Space)");
            ui.add(egui::Slider::new(&mut state.exposure, 0.0..=5.0).text("exposure (Q/E)"));
            ui.checkbox(&mut state.bling, "bling (B)");

            ui.separator();
            ui.small("F1: settings | F2: info | WASD: move | C/P: diamond | Esc: quit");
        });
}

fn info_panel(ctx: &egui::Context, state: &ProgramState, stats: &FrameStats) {
    let camera = &state.camera;
    egui::Window::new("Info")
        .default_pos([10.0, 400.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("{:.0} fps ({:.2} ms)", stats.fps, stats.frame_ms));
            ui.separator();
            ui.label(format!("Position: {}", vec3_label(camera.position)));
            ui.label(format!("Front: {}", vec3_label(camera.front)));
            ui.label(format!(
                "Yaw {:.1}  Pitch {:.1}  Zoom {:.1}",
                camera.yaw, camera.pitch, camera.zoom
            ));
            ui.separator();
            ui.label(format!("Diamond: {}", state.diamond_color.name()));
            ui.label(format!(
                "Bloom: {}  Exposure: {:.2}  Bling: {}",
                if state.bloom_enabled { "on" } else { "off" },
                state.exposure,
                if state.bling { "on" } else { "off" },
            ));
            if state.in_special_zone {
                ui.colored_label(egui::Color32::LIGHT_BLUE, "Inside the cube");
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_sets_fps() {
        let mut stats = FrameStats::default();
        stats.record(0.02);
        assert!((stats.fps - 50.0).abs() < 1e-3);
        assert!((stats.frame_ms - 20.0).abs() < 1e-3);
    }

    #[test]
    fn later_samples_are_smoothed() {
        let mut stats = FrameStats::default();
        stats.record(0.02);
        stats.record(0.01);
        assert!(stats.fps > 50.0 && stats.fps < 100.0);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut stats = FrameStats::default();
        stats.record(0.0);
        assert_eq!(stats.fps, 0.0);
    }
}
