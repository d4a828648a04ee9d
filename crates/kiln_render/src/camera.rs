//! 2D orthographic camera.

use glam::{Mat4, UVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// World point at the center of the viewport.
    pub center: Vec2,
    pub zoom: f32,
    /// Viewport size in physical pixels.
    pub viewport: UVec2,
    /// Screen pixels per world unit at zoom 1.
    pub pixels_per_unit: f32,
}

impl Camera2D {
    pub fn new(viewport: UVec2, pixels_per_unit: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            viewport,
            pixels_per_unit,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = UVec2::new(width.max(1), height.max(1));
    }

    /// Half the visible world extent along each axis.
    pub fn half_extent(&self) -> Vec2 {
        self.viewport.max(UVec2::ONE).as_vec2() / (2.0 * self.pixels_per_unit * self.zoom)
    }

    /// World to clip space, +Y up, depth in `[0, 1]`.
    pub fn view_projection(&self) -> Mat4 {
        let half = self.half_extent();
        Mat4::orthographic_rh(
            self.center.x - half.x,
            self.center.x + half.x,
            self.center.y - half.y,
            self.center.y + half.y,
            -1.0,
            1.0,
        )
    }

    /// Window coordinates (origin top-left, +Y down) to world space.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let size = self.viewport.max(UVec2::ONE).as_vec2();
        let ndc = Vec2::new(screen.x / size.x * 2.0 - 1.0, 1.0 - screen.y / size.y * 2.0);
        self.center + ndc * self.half_extent()
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(UVec2::new(1280, 720), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn center_maps_to_clip_origin() {
        let camera = Camera2D {
            center: Vec2::new(5.0, -3.0),
            ..Camera2D::new(UVec2::new(800, 600), 2.0)
        };
        let clip = camera.view_projection().project_point3(Vec3::new(5.0, -3.0, 0.0));
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn viewport_edges_map_to_clip_edges() {
        let camera = Camera2D::new(UVec2::new(800, 600), 2.0);
        // 800 px / 2 ppu = 400 units wide.
        let corner = camera.view_projection().project_point3(Vec3::new(200.0, 150.0, 0.0));
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn screen_to_world_flips_y() {
        let mut camera = Camera2D::new(UVec2::new(100, 100), 1.0);
        camera.zoom = 2.0;
        let top_left = camera.screen_to_world(Vec2::ZERO);
        assert_relative_eq!(top_left.x, -25.0);
        assert_relative_eq!(top_left.y, 25.0);
        assert_eq!(camera.screen_to_world(Vec2::splat(50.0)), Vec2::ZERO);
    }
}
