//! Kiln Services Layer
//!
//! Platform-facing pieces around the frame pipeline: settings, input state and
//! the command type delivered into the simulation thread.

pub mod command;
pub mod input;
pub mod settings;

pub use command::SimCommand;
pub use input::{Button, InputEvent, InputSnapshot, InputState};
pub use settings::{Settings, SettingsError};
