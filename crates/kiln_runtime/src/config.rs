//! Settings to engine configuration.

use kiln_render::raster::RenderConfig;
use kiln_render::renderable::Color;
use kiln_render::window::WindowConfig;
use kiln_services::Settings;

pub fn render_config(settings: &Settings) -> RenderConfig {
    let render = &settings.render;
    let [r, g, b, a] = render.clear_color;
    RenderConfig {
        max_primitives_per_batch: render.max_primitives_per_batch,
        pixels_per_unit: render.pixels_per_unit,
        circle_segments: render.circle_segments,
        clear_color: Color::rgba(r, g, b, a),
        simd: render.simd,
    }
}

pub fn window_config(settings: &Settings) -> WindowConfig {
    let window = &settings.window;
    WindowConfig {
        title: window.title.clone(),
        width: window.width,
        height: window.height,
        vsync: window.vsync,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_engine_defaults() {
        let settings = Settings::default();
        assert_eq!(render_config(&settings), RenderConfig::default());
        assert_eq!(window_config(&settings), WindowConfig::default());
    }

    #[test]
    fn valid_settings_give_a_valid_render_config() {
        let mut settings = Settings::default();
        settings.render.max_primitives_per_batch = 3;
        settings.render.circle_segments = 3;
        settings.render.clear_color = [1, 2, 3, 4];
        settings.validate().unwrap();

        let config = render_config(&settings);
        config.validate().unwrap();
        assert_eq!(config.clear_color, Color::rgba(1, 2, 3, 4));
    }
}
