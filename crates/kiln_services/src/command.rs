//! Messages delivered into the simulation thread.

use crate::input::{InputEvent, InputSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    /// Latest held-button and cursor state.
    Input(InputSnapshot),
    /// Discrete events since the previous frame.
    Events(Vec<InputEvent>),
    /// Reseed and respawn the scene.
    Reset { seed: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, InputState};
    use kiln_core::queue::CommandQueue;

    #[test]
    fn frame_input_arrives_as_one_batch() {
        let mut state = InputState::new();
        state.handle(InputEvent::Pressed(Button::Action));
        state.handle(InputEvent::Released(Button::Action));

        let queue = CommandQueue::new();
        queue.push(SimCommand::Input(state.snapshot()));
        queue.push(SimCommand::Events(state.drain_events()));

        let mut received = Vec::new();
        assert_eq!(queue.execute(|command| received.push(command)), 2);
        assert!(matches!(&received[0], SimCommand::Input(snapshot) if !snapshot.is_held(Button::Action)));
        assert!(matches!(&received[1], SimCommand::Events(events) if events.len() == 2));
    }
}
