use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::light::LightSource;

/// Identifier for a key press delivered by the host.
///
/// Printable keys are kept exactly as typed, so `'w'` and `'W'` are distinct.
/// `Escape` is the only non-printable key the host forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Character(char),
    Escape,
}

impl KeyCode {
    /// Maps the text produced by a key press to a key code. Only single
    /// characters are accepted.
    pub fn from_text(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(Self::Character(ch)),
            _ => None,
        }
    }
}

/// Mutation requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    MoveLight(Vec3),
    MoveCamera(Vec3),
}

/// Characters bound to each movement plus the step applied per press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub step: f32,
    pub light_up: char,
    pub light_down: char,
    pub camera_left: char,
    pub camera_right: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            step: 0.5,
            light_up: 'w',
            light_down: 's',
            camera_left: 'a',
            camera_right: 'd',
        }
    }
}

impl KeyBindings {
    pub fn keys(&self) -> [char; 4] {
        [
            self.light_up,
            self.light_down,
            self.camera_left,
            self.camera_right,
        ]
    }
}

/// Stateless mapping from key presses to light/camera steps.
///
/// Movements are unbounded; unrecognised keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    bindings: KeyBindings,
}

impl InputController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn action_for(&self, key: KeyCode) -> Option<InputAction> {
        let KeyCode::Character(ch) = key else {
            return None;
        };
        let b = &self.bindings;
        let step = b.step;
        match ch {
            c if c == b.light_up => Some(InputAction::MoveLight(Vec3::new(0.0, step, 0.0))),
            c if c == b.light_down => Some(InputAction::MoveLight(Vec3::new(0.0, -step, 0.0))),
            c if c == b.camera_left => Some(InputAction::MoveCamera(Vec3::new(-step, 0.0, 0.0))),
            c if c == b.camera_right => Some(InputAction::MoveCamera(Vec3::new(step, 0.0, 0.0))),
            _ => None,
        }
    }

    /// Applies the action bound to `key`, if any, and returns it.
    pub fn handle_key(
        &self,
        key: KeyCode,
        light: &mut LightSource,
        camera: &mut CameraState,
    ) -> Option<InputAction> {
        let action = self.action_for(key)?;
        match action {
            InputAction::MoveLight(delta) => light.translate(delta),
            InputAction::MoveCamera(delta) => camera.translate(delta),
        }
        debug!("{key:?} -> {action:?}");
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(controller: &InputController, keys: &str) -> (LightSource, CameraState) {
        let mut light = LightSource::new(Vec3::ZERO, 0.5, 1.5);
        let mut camera = CameraState {
            position: Vec3::ZERO,
            ..CameraState::default()
        };
        for ch in keys.chars() {
            controller.handle_key(KeyCode::Character(ch), &mut light, &mut camera);
        }
        (light, camera)
    }

    #[test]
    fn parses_text_into_key_codes() {
        assert_eq!(KeyCode::from_text("w"), Some(KeyCode::Character('w')));
        assert_eq!(KeyCode::from_text("Escape"), None);
        assert_eq!(KeyCode::from_text(""), None);
        assert_eq!(KeyCode::from_text("ww"), None);
    }

    #[test]
    fn w_and_s_move_the_light_vertically() {
        let controller = InputController::default();
        let (light, camera) = press(&controller, "w");
        assert_eq!(light.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(camera.position, Vec3::ZERO);
        let (light, _) = press(&controller, "wss");
        assert_eq!(light.position.y, -0.5);
    }

    #[test]
    fn a_and_d_pan_the_camera() {
        let controller = InputController::default();
        let (light, camera) = press(&controller, "aaa");
        assert_eq!(camera.position, Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(light.position, Vec3::ZERO);
        let (_, camera) = press(&controller, "dad");
        assert_eq!(camera.position.x, 0.5);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let controller = InputController::default();
        assert_eq!(controller.action_for(KeyCode::Character('W')), None);
        assert_eq!(controller.action_for(KeyCode::Escape), None);
        let (light, camera) = press(&controller, "qxWz ");
        assert_eq!(light.position, Vec3::ZERO);
        assert_eq!(camera.position, Vec3::ZERO);
    }

    #[test]
    fn movement_is_unbounded() {
        let controller = InputController::default();
        let (light, _) = press(&controller, &"w".repeat(1000));
        assert_eq!(light.position.y, 500.0);
    }

    #[test]
    fn custom_bindings_are_honoured() {
        let controller = InputController::new(KeyBindings {
            step: 2.0,
            light_up: 'i',
            light_down: 'k',
            camera_left: 'j',
            camera_right: 'l',
        });
        let (light, camera) = press(&controller, "iwl");
        assert_eq!(light.position.y, 2.0);
        assert_eq!(camera.position.x, 2.0);
    }
}
