//! Input polling and camera key bindings

use std::collections::HashSet;
use macroquad::prelude::{
    get_keys_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};
use crate::config::ControlsConfig;
use crate::rasterizer::{BasisAxis, CameraCommand};

/// Movement keys: key, basis vector to follow, direction sign
pub const MOVE_BINDINGS: [(KeyCode, BasisAxis, f32); 6] = [
    (KeyCode::A, BasisAxis::Right, -1.0),
    (KeyCode::D, BasisAxis::Right, 1.0),
    (KeyCode::W, BasisAxis::Forward, 1.0),
    (KeyCode::S, BasisAxis::Forward, -1.0),
    (KeyCode::F, BasisAxis::Up, -1.0),
    (KeyCode::R, BasisAxis::Up, 1.0),
];

/// Input state for one frame
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub keys_down: HashSet<KeyCode>,
    /// Mouse motion in pixels since the previous poll (only while looking)
    pub mouse_delta: (f32, f32),
    pub quit: bool,
}

impl InputFrame {
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Commands for this frame, in binding order, mouse look last
    pub fn camera_commands(&self, controls: &ControlsConfig) -> impl Iterator<Item = CameraCommand> + '_ {
        let speed = controls.move_speed;
        let moves = MOVE_BINDINGS
            .iter()
            .filter(move |(key, _, _)| self.is_down(*key))
            .map(move |&(_, axis, sign)| CameraCommand::Move { axis, amount: sign * speed });

        let radians_per_pixel = controls.mouse_sensitivity.to_radians();
        let (dx, dy) = self.mouse_delta;
        let look = (dx != 0.0 || dy != 0.0)
            .then(|| [CameraCommand::Yaw(dx * radians_per_pixel), CameraCommand::Pitch(dy * radians_per_pixel)]);

        moves.chain(look.into_iter().flatten())
    }
}

/// Polls macroquad once per frame; mouse look while the right button is held
#[derive(Debug, Default)]
pub struct InputPoller {
    last_mouse: Option<(f32, f32)>,
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self) -> InputFrame {
        let mouse = mouse_position();
        let mouse_delta = if is_mouse_button_down(MouseButton::Right) {
            let delta = self
                .last_mouse
                .map(|(x, y)| (mouse.0 - x, mouse.1 - y))
                .unwrap_or((0.0, 0.0));
            self.last_mouse = Some(mouse);
            delta
        } else {
            self.last_mouse = None;
            (0.0, 0.0)
        };

        InputFrame {
            keys_down: get_keys_down(),
            mouse_delta,
            quit: is_key_pressed(KeyCode::Escape),
        }
    }
}
