//! Commands marshalled into the render thread.

use crate::camera::Camera2D;
use crate::raster::RenderSystem;
use crate::renderable::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Surface size changed, in physical pixels.
    Resize { width: u32, height: u32 },
    SetClearColor(Color),
    SetCamera(Camera2D),
}

impl RenderCommand {
    /// Apply to the render-thread state this command touches. Surface resizing
    /// is left to the caller, which owns the backend.
    pub fn apply(&self, system: &mut RenderSystem, camera: &mut Camera2D) {
        match *self {
            RenderCommand::Resize { width, height } => camera.resize(width, height),
            RenderCommand::SetClearColor(color) => system.set_clear_color(color),
            RenderCommand::SetCamera(next) => {
                let viewport = camera.viewport;
                *camera = Camera2D { viewport, ..next };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RenderConfig;
    use glam::{UVec2, Vec2};
    use kiln_core::queue::CommandQueue;

    #[test]
    fn queued_commands_apply_in_order() {
        let queue = CommandQueue::new();
        queue.push(RenderCommand::SetClearColor(Color::WHITE));
        queue.push(RenderCommand::Resize {
            width: 640,
            height: 480,
        });
        queue.push(RenderCommand::SetCamera(Camera2D {
            center: Vec2::new(1.0, 2.0),
            ..Camera2D::default()
        }));
        queue.push(RenderCommand::SetClearColor(Color::BLACK));

        let mut system = RenderSystem::new(RenderConfig::default()).unwrap();
        let mut camera = Camera2D::default();
        let applied = queue.execute(|command| command.apply(&mut system, &mut camera));

        assert_eq!(applied, 4);
        assert_eq!(system.clear_color(), Color::BLACK);
        assert_eq!(camera.viewport, UVec2::new(640, 480));
        assert_eq!(camera.center, Vec2::new(1.0, 2.0));
    }
}
