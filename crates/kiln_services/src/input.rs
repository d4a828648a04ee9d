//! Input state
//!
//! Platform events are translated into [`InputEvent`]s on the window thread.
//! [`InputState`] folds them into a per-frame [`InputSnapshot`] for the
//! simulation.

use kiln_core::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Action,
    Pointer,
}

impl Button {
    const COUNT: usize = 6;

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pressed(Button),
    Released(Button),
    /// Cursor position in world units.
    CursorMoved(Vec2),
}

/// Input as seen by one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    held: u8,
    pub cursor: Option<Vec2>,
}

impl InputSnapshot {
    pub fn is_held(&self, button: Button) -> bool {
        self.held & button.bit() != 0
    }

    /// Directional axis from the held arrow buttons, each component in -1..=1.
    pub fn axis(&self) -> Vec2 {
        let component = |neg: Button, pos: Button| {
            (self.is_held(pos) as i8 - self.is_held(neg) as i8) as f32
        };
        Vec2::new(
            component(Button::Left, Button::Right),
            component(Button::Down, Button::Up),
        )
    }
}

/// Accumulates events between frames.
#[derive(Debug, Default)]
pub struct InputState {
    current: InputSnapshot,
    pending: Vec<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(button) => self.current.held |= button.bit(),
            InputEvent::Released(button) => self.current.held &= !button.bit(),
            InputEvent::CursorMoved(position) => self.current.cursor = Some(position),
        }
        self.pending.push(event);
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.current
    }

    /// Events received since the last drain, in arrival order.
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Drop held buttons, e.g. on focus loss.
    pub fn release_all(&mut self) {
        for shift in 0..Button::COUNT {
            if self.current.held & (1 << shift) != 0 {
                self.pending.push(InputEvent::Released(ALL_BUTTONS[shift]));
            }
        }
        self.current.held = 0;
    }
}

const ALL_BUTTONS: [Button; Button::COUNT] = [
    Button::Up,
    Button::Down,
    Button::Left,
    Button::Right,
    Button::Action,
    Button::Pointer,
];
