//! Window management
//!
//! Cross-platform window creation via winit. Windows must be created inside
//! `ApplicationHandler::resumed`; this module only builds the attributes.

use winit::window::Window;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kiln".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Create window attributes from config
pub fn window_attributes(config: &WindowConfig) -> winit::window::WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
}
