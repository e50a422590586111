use crate::action::Action;
use crate::key::Key;
use crate::mouse::MouseLook;
use diamond_common::DiamondColor;
use diamond_scene::CameraMovement;
use std::collections::HashSet;

/// Rising-edge detector for a polled key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debounce {
    was_down: bool,
}

impl Debounce {
    /// True only on the first frame `down` is seen after being up.
    pub fn rising_edge(&mut self, down: bool) -> bool {
        let edge = down && !self.was_down;
        self.was_down = down;
        edge
    }
}

/// Per-window input state.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    bloom_toggle: Debounce,
    mouse: MouseLook,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Record a key transition. Returns the edge-triggered action, if any.
    pub fn key_event(&mut self, key: Key, pressed: bool, repeat: bool) -> Option<Action> {
        if !pressed {
            self.held.remove(&key);
            return None;
        }
        self.held.insert(key);
        if repeat {
            return None;
        }
        let action = match key {
            Key::F1 => Action::ToggleSettingsPanel,
            Key::F2 => Action::ToggleInfoPanel,
            Key::B => Action::ToggleBling,
            _ => return None,
        };
        tracing::debug!(?key, ?action, "key pressed");
        Some(action)
    }

    /// Actions derived from the held-key set. Call once per frame.
    pub fn poll(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.is_held(Key::Escape) {
            actions.push(Action::Quit);
        }

        for (key, movement) in [
            (Key::W, CameraMovement::Forward),
            (Key::S, CameraMovement::Backward),
            (Key::A, CameraMovement::Left),
            (Key::D, CameraMovement::Right),
        ] {
            if self.is_held(key) {
                actions.push(Action::MoveCamera(movement));
            }
        }

        if self.is_held(Key::C) {
            actions.push(Action::SelectDiamond(DiamondColor::Cyan));
        }
        if self.is_held(Key::P) {
            actions.push(Action::SelectDiamond(DiamondColor::Pink));
        }

        if self.bloom_toggle.rising_edge(self.is_held(Key::Space)) {
            actions.push(Action::ToggleBloom);
        }

        if self.is_held(Key::Q) {
            actions.push(Action::AdjustExposure(-1.0));
        }
        if self.is_held(Key::E) {
            actions.push(Action::AdjustExposure(1.0));
        }

        actions
    }

    /// Feed an absolute cursor position. The tracker always advances so that
    /// re-enabling look does not jump; a `Look` is emitted only when enabled.
    pub fn cursor_moved(&mut self, x: f64, y: f64, look_enabled: bool) -> Option<Action> {
        let (dx, dy) = self.mouse.sample(x, y)?;
        look_enabled.then_some(Action::Look { dx, dy })
    }

    pub fn scroll(&self, lines: f32) -> Action {
        Action::Zoom(lines)
    }

    /// Called when the cursor is grabbed again or focus returns.
    pub fn reset_mouse(&mut self) {
        self.mouse.reset();
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(actions: &[Action], wanted: Action) -> usize {
        actions.iter().filter(|a| **a == wanted).count()
    }

    #[test]
    fn bloom_toggles_once_per_press() {
        let mut input = InputState::new();
        input.key_event(Key::Space, true, false);
        let mut toggles = 0;
        for _ in 0..30 {
            toggles += count(&input.poll(), Action::ToggleBloom);
        }
        assert_eq!(toggles, 1);

        input.key_event(Key::Space, false, false);
        assert_eq!(count(&input.poll(), Action::ToggleBloom), 0);

        input.key_event(Key::Space, true, false);
        assert_eq!(count(&input.poll(), Action::ToggleBloom), 1);
    }

    #[test]
    fn panel_keys_are_edge_triggered() {
        let mut input = InputState::new();
        assert_eq!(
            input.key_event(Key::F1, true, false),
            Some(Action::ToggleSettingsPanel)
        );
        assert_eq!(input.key_event(Key::F1, true, true), None);
        assert_eq!(input.key_event(Key::F1, false, false), None);
        assert_eq!(
            input.key_event(Key::F2, true, false),
            Some(Action::ToggleInfoPanel)
        );
        assert_eq!(input.key_event(Key::B, true, false), Some(Action::ToggleBling));
        assert!(input.poll().iter().all(|a| *a != Action::ToggleBling));
    }

    #[test]
    fn held_movement_repeats_every_frame() {
        let mut input = InputState::new();
        input.key_event(Key::W, true, false);
        input.key_event(Key::D, true, false);
        for _ in 0..3 {
            let actions = input.poll();
            assert_eq!(count(&actions, Action::MoveCamera(CameraMovement::Forward)), 1);
            assert_eq!(count(&actions, Action::MoveCamera(CameraMovement::Right)), 1);
        }
        input.key_event(Key::W, false, false);
        assert_eq!(
            count(&input.poll(), Action::MoveCamera(CameraMovement::Forward)),
            0
        );
    }

    #[test]
    fn color_keys_select_diamond() {
        let mut input = InputState::new();
        input.key_event(Key::P, true, false);
        assert!(input.poll().contains(&Action::SelectDiamond(DiamondColor::Pink)));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputState::new();
        input.key_event(Key::Escape, true, false);
        assert!(input.poll().contains(&Action::Quit));
    }

    #[test]
    fn disabled_look_still_tracks_cursor() {
        let mut input = InputState::new();
        assert_eq!(input.cursor_moved(100.0, 100.0, true), None);
        assert_eq!(input.cursor_moved(150.0, 100.0, false), None);
        assert_eq!(
            input.cursor_moved(160.0, 90.0, true),
            Some(Action::Look { dx: 10.0, dy: 10.0 })
        );
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut input = InputState::new();
        input.key_event(Key::A, true, false);
        input.release_all();
        assert!(!input.is_held(Key::A));
        assert!(input.poll().is_empty());
    }
}
