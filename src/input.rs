//! Input mapping.
//!
//! Translates winit keyboard and mouse events into the handful of discrete
//! actions the kitchen session understands:
//!
//! | Input | Action |
//! |---|---|
//! | Tab | toggle look engage |
//! | Escape | release look |
//! | W / A / S / D | movement axes (down and up) |
//! | Left mouse | drag press / release |
//! | E | interact |

use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAxis {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    ToggleLook,
    ReleaseLook,
    Move { axis: MoveAxis, pressed: bool },
    DragPress,
    DragRelease,
    Interact,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InputMapper;

impl InputMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map_key(&self, key: KeyCode, state: ElementState, repeat: bool) -> Option<InputAction> {
        let pressed = state == ElementState::Pressed;

        let axis = match key {
            KeyCode::KeyW => Some(MoveAxis::Forward),
            KeyCode::KeyS => Some(MoveAxis::Backward),
            KeyCode::KeyA => Some(MoveAxis::Left),
            KeyCode::KeyD => Some(MoveAxis::Right),
            _ => None,
        };
        if let Some(axis) = axis {
            return Some(InputAction::Move { axis, pressed });
        }

        // Discrete triggers fire once per physical press
        if !pressed || repeat {
            return None;
        }
        match key {
            KeyCode::Tab => Some(InputAction::ToggleLook),
            KeyCode::Escape => Some(InputAction::ReleaseLook),
            KeyCode::KeyE => Some(InputAction::Interact),
            _ => None,
        }
    }

    pub fn map_key_event(&self, event: &KeyEvent) -> Option<InputAction> {
        match event.physical_key {
            PhysicalKey::Code(code) => self.map_key(code, event.state, event.repeat),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    pub fn map_mouse_button(&self, button: MouseButton, state: ElementState) -> Option<InputAction> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => Some(InputAction::DragPress),
            (MouseButton::Left, ElementState::Released) => Some(InputAction::DragRelease),
            _ => None,
        }
    }

    /// Raw device events, used while the cursor is grabbed
    pub fn map_device_event(&self, event: &DeviceEvent) -> Option<InputAction> {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => self.map_mouse_button(MouseButton::Left, *state),
            _ => None,
        }
    }
}

/// Which movement keys are currently held. The host camera reads this.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementAxes {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementAxes {
    pub fn apply(&mut self, axis: MoveAxis, pressed: bool) {
        match axis {
            MoveAxis::Forward => self.forward = pressed,
            MoveAxis::Backward => self.backward = pressed,
            MoveAxis::Left => self.left = pressed,
            MoveAxis::Right => self.right = pressed,
        }
    }

    /// (right, forward) in -1.0..=1.0
    pub fn direction(&self) -> (f32, f32) {
        let axis = |positive: bool, negative: bool| (positive as i8 - negative as i8) as f32;
        (axis(self.right, self.left), axis(self.forward, self.backward))
    }
}
